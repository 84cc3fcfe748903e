//! 错误类型
//!
//! 库内各边界使用 `thiserror` 定义具体错误，应用层（`App`、文件读写）统一用 `anyhow`。

use thiserror::Error;

/// Agent 服务错误
///
/// 任何一种都会让当前会话立即进入 `Failed`，不做重试。
#[derive(Debug, Error)]
pub enum AgentError {
    /// 网络请求失败
    #[error("Agent 服务请求失败 (模型: {model}): {message}")]
    Transport { model: String, message: String },

    /// 服务端返回错误
    #[error("Agent 服务返回错误 (模型: {model}): {message}")]
    Service { model: String, message: String },

    /// 响应格式不符合约定
    #[error("Agent 响应格式错误: {0}")]
    MalformedResponse(String),

    /// 构建请求失败
    #[error("构建 Agent 请求失败: {0}")]
    Request(String),
}

/// 工具调用错误
///
/// 只会以 `ToolResult { is_error: true }` 的形式出现在会话记录里。
#[derive(Debug, Error)]
pub enum ToolError {
    /// 工具未启用
    #[error("工具 {0} 未被允许")]
    NotPermitted(String),

    /// 工具未配置
    #[error("工具 {0} 不可用: 缺少配置")]
    Unavailable(String),

    /// 参数缺失或格式错误
    #[error("工具参数错误: {0}")]
    InvalidInput(String),

    /// 网络请求失败
    #[error("工具请求失败 ({url}): {source}")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 远端返回非成功状态码
    #[error("工具请求返回状态码 {status} ({url})")]
    BadStatus { url: String, status: u16 },
}

/// 列表字面量解析错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// 没有可解析的内容
    #[error("内容为空")]
    Empty,

    /// 不是合法的 JSON 数组
    #[error("不是合法的列表: {0}")]
    NotAList(String),

    /// 数组元素不是字符串
    #[error("第 {index} 个元素不是字符串")]
    NonStringElement { index: usize },
}

/// 会话日志写入错误
#[derive(Debug, Error)]
pub enum LoggerError {
    /// 写入文件失败
    #[error("写入会话日志失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },

    /// 没有任何可用工具
    #[error("允许的工具列表为空")]
    EmptyToolSet,

    /// `.env` 文件存在但无法解析
    #[error(".env 文件 {path} 解析失败: {source}")]
    DotEnv {
        path: String,
        #[source]
        source: dotenvy::Error,
    },
}
