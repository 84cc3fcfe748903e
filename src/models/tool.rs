use std::str::FromStr;

/// Agent 可使用的外部工具
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ToolKind {
    /// 网页搜索
    WebSearch,
    /// 抓取网页
    WebFetch,
}

impl ToolKind {
    /// 对外暴露的工具名
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::WebSearch => "WebSearch",
            ToolKind::WebFetch => "WebFetch",
        }
    }

    /// 工具描述，提供给模型
    pub fn description(self) -> &'static str {
        match self {
            ToolKind::WebSearch => "Search the web and return the raw result listing for a query.",
            ToolKind::WebFetch => "Fetch a web page by URL and return its visible text.",
        }
    }

    /// 工具参数的 JSON Schema
    pub fn parameters(self) -> serde_json::Value {
        match self {
            ToolKind::WebSearch => serde_json::json!({
                "type": "object",
                "properties": { "query": { "type": "string", "description": "Search query" } },
                "required": ["query"]
            }),
            ToolKind::WebFetch => serde_json::json!({
                "type": "object",
                "properties": { "url": { "type": "string", "description": "Absolute URL to fetch" } },
                "required": ["url"]
            }),
        }
    }
}

impl FromStr for ToolKind {
    type Err = String;

    /// 大小写不敏感，同时接受 `web_search` 这种写法
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "").as_str() {
            "websearch" => Ok(ToolKind::WebSearch),
            "webfetch" => Ok(ToolKind::WebFetch),
            other => Err(format!("未知工具: {}", other)),
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_kind_round_trips_through_name() {
        for tool in [ToolKind::WebSearch, ToolKind::WebFetch] {
            assert_eq!(tool.name().parse::<ToolKind>(), Ok(tool));
        }
        assert_eq!("web_fetch".parse::<ToolKind>(), Ok(ToolKind::WebFetch));
        assert!("Bash".parse::<ToolKind>().is_err());
    }
}
