//! 网页工具 - 业务能力层
//!
//! 只负责执行 `WebSearch` / `WebFetch` 两个工具，不关心对话流程。

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::ToolError;
use crate::models::ToolKind;
use crate::utils::logging::truncate_text;

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("script 正则非法"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b.*?</style>").expect("style 正则非法"));
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("标签正则非法"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("空白正则非法"));

/// 工具执行器
#[async_trait]
pub trait ToolRunner: Send + Sync {
    async fn run(&self, tool: ToolKind, input: &serde_json::Value) -> Result<String, ToolError>;
}

/// 基于 HTTP 的网页工具
pub struct WebTools {
    client: reqwest::Client,
    search_api_url: Option<String>,
    output_limit: usize,
}

impl WebTools {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("founder-finder/0.1")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            search_api_url: config.search_api_url.clone(),
            output_limit: config.tool_output_limit,
        }
    }

    async fn web_search(&self, query: &str) -> Result<String, ToolError> {
        let endpoint = self
            .search_api_url
            .as_deref()
            .ok_or_else(|| ToolError::Unavailable(ToolKind::WebSearch.name().to_string()))?;

        debug!("🔍 搜索: {}", query);
        let response = self
            .client
            .get(endpoint)
            .query(&[("q", query), ("format", "json")])
            .send()
            .await
            .map_err(|source| ToolError::RequestFailed {
                url: endpoint.to_string(),
                source,
            })?;

        let body = read_body(endpoint, response).await?;
        Ok(truncate_text(&body, self.output_limit))
    }

    async fn web_fetch(&self, url: &str) -> Result<String, ToolError> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ToolError::InvalidInput(format!("不是合法的网址: {}", url)));
        }

        debug!("🌐 抓取: {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ToolError::RequestFailed {
                url: url.to_string(),
                source,
            })?;

        let body = read_body(url, response).await?;
        Ok(truncate_text(&strip_html(&body), self.output_limit))
    }
}

#[async_trait]
impl ToolRunner for WebTools {
    async fn run(&self, tool: ToolKind, input: &serde_json::Value) -> Result<String, ToolError> {
        match tool {
            ToolKind::WebSearch => self.web_search(required_str(input, "query")?).await,
            ToolKind::WebFetch => self.web_fetch(required_str(input, "url")?).await,
        }
    }
}

async fn read_body(url: &str, response: reqwest::Response) -> Result<String, ToolError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ToolError::BadStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    response
        .text()
        .await
        .map_err(|source| ToolError::RequestFailed {
            url: url.to_string(),
            source,
        })
}

/// 读取工具参数中的字符串字段
pub fn required_str<'a>(input: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ToolError::InvalidInput(format!("缺少参数 `{}`", key)))
}

/// 把 HTML 粗略转换为可读文本
pub fn strip_html(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, " ");
    let text = STYLE_BLOCK.replace_all(&text, " ");
    let text = HTML_TAG.replace_all(&text, " ");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}
