use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 一个待调研的公司
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 公司名称
    pub identifier: String,
    /// 公司官网（可能为空）
    pub reference_url: String,
}

impl Record {
    pub fn new(identifier: impl Into<String>, reference_url: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            reference_url: reference_url.into(),
        }
    }

    /// 解析输入文件中的一行
    ///
    /// 格式为 `公司名 (https://url)`；没有括号网址时整行作为公司名，网址留空。
    /// 空行返回 `None`。
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if let Some(body) = line.strip_suffix(')') {
            if let Some(open) = body.find('(') {
                let name = body[..open].trim();
                let url = body[open + 1..].trim();
                if !name.is_empty() && !url.is_empty() {
                    return Some(Self::new(name, url));
                }
            }
        }

        Some(Self::new(line, ""))
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.reference_url.is_empty() {
            write!(f, "{}", self.identifier)
        } else {
            write!(f, "{} ({})", self.identifier, self.reference_url)
        }
    }
}
