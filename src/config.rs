use std::path::Path;

use crate::error::ConfigError;
use crate::models::ToolKind;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 每个会话允许的最大轮数
    pub max_turns: usize,
    /// 同时运行的会话上限（None 表示全部同时派发）
    pub max_concurrent_sessions: Option<usize>,
    /// 单轮内允许的工具往返次数
    pub max_tool_rounds: usize,
    /// 允许 agent 使用的工具
    pub allowed_tools: Vec<ToolKind>,
    /// 输入文件（每行一个公司）
    pub input_file: String,
    /// 输出 JSON 文件
    pub output_file: String,
    /// 会话日志目录（None 表示不落盘）
    pub transcript_dir: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    // --- 工具配置 ---
    /// 搜索接口地址，WebSearch 以 `q` 参数调用
    pub search_api_url: Option<String>,
    /// 工具输出截断长度（字符）
    pub tool_output_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_turns: 10,
            max_concurrent_sessions: None,
            max_tool_rounds: 8,
            allowed_tools: vec![ToolKind::WebSearch, ToolKind::WebFetch],
            input_file: "companies.txt".to_string(),
            output_file: "founders.json".to_string(),
            transcript_dir: Some("logs".to_string()),
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "claude-sonnet-4-5-20250929".to_string(),
            search_api_url: None,
            tool_output_limit: 12_000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_turns: std::env::var("MAX_TURNS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_turns),
            max_concurrent_sessions: std::env::var("MAX_CONCURRENT_SESSIONS").ok().and_then(|v| v.parse().ok()).filter(|n: &usize| *n > 0),
            max_tool_rounds: std::env::var("MAX_TOOL_ROUNDS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_tool_rounds),
            allowed_tools: std::env::var("ALLOWED_TOOLS").ok().map(|v| parse_tool_list(&v)).unwrap_or(default.allowed_tools),
            input_file: std::env::var("INPUT_FILE").unwrap_or(default.input_file),
            output_file: std::env::var("OUTPUT_FILE").unwrap_or(default.output_file),
            transcript_dir: match std::env::var("TRANSCRIPT_DIR") {
                Ok(v) if v.trim().is_empty() => None,
                Ok(v) => Some(v),
                Err(_) => default.transcript_dir,
            },
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            search_api_url: std::env::var("SEARCH_API_URL").ok().filter(|v| !v.trim().is_empty()),
            tool_output_limit: std::env::var("TOOL_OUTPUT_LIMIT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.tool_output_limit),
        }
    }

    /// 检查启动前必须具备的配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "LLM_API_KEY".to_string(),
            });
        }
        if self.allowed_tools.is_empty() {
            return Err(ConfigError::EmptyToolSet);
        }
        Ok(())
    }
}

/// 把 `.env` 文件中的变量写入进程环境
///
/// 文件不存在时返回 `Ok(false)`。文件中的值覆盖已有的同名环境变量。
pub fn load_dotenv(path: impl AsRef<Path>) -> Result<bool, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(false);
    }
    dotenvy::from_path_override(path).map_err(|source| ConfigError::DotEnv {
        path: path.display().to_string(),
        source,
    })?;
    Ok(true)
}

/// 解析逗号分隔的工具列表，未知名称直接忽略
fn parse_tool_list(raw: &str) -> Vec<ToolKind> {
    let mut tools = Vec::new();
    for name in raw.split(',') {
        match name.trim().parse::<ToolKind>() {
            Ok(tool) if !tools.contains(&tool) => tools.push(tool),
            Ok(_) => {}
            Err(_) => tracing::warn!("⚠️ 忽略未知工具: {}", name.trim()),
        }
    }
    tools
}
