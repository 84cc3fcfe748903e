//! 列表字面量解析
//!
//! 所有函数都返回 `Result` / `Option`，不依赖 panic 或异常控制流程。

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ParseError;

static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json|JSON)?\s*|\s*```").expect("代码块正则非法"));

static FINAL_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<final>(.*?)</final>").expect("final 标记正则非法"));

static PROGRESS_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<progress>(.*?)</progress>").expect("progress 标记正则非法"));

/// 模型输出中使用的标记对
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `<final>[...]</final>`：最终答案
    Final,
    /// `<progress>[...]</progress>`：阶段性结果
    Progress,
}

impl Marker {
    fn pattern(self) -> &'static Regex {
        match self {
            Marker::Final => &*FINAL_TAG,
            Marker::Progress => &*PROGRESS_TAG,
        }
    }
}

/// 把一段文本解析为字符串列表
///
/// 会先去掉 Markdown 代码块包裹；`null` 元素被丢弃，其他非字符串元素视为解析失败。
pub fn parse_string_list(raw: &str) -> Result<Vec<String>, ParseError> {
    let cleaned = CODE_FENCE.replace_all(raw, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ParseError::Empty);
    }

    let values: Vec<serde_json::Value> =
        serde_json::from_str(cleaned).map_err(|e| ParseError::NotAList(e.to_string()))?;

    let mut names = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        match value {
            serde_json::Value::String(name) => names.push(name),
            serde_json::Value::Null => {}
            _ => return Err(ParseError::NonStringElement { index }),
        }
    }
    Ok(names)
}

/// 查找文本中最后一个可解析的标记对
pub fn find_tagged(text: &str, marker: Marker) -> Option<Vec<String>> {
    let bodies: Vec<&str> = marker
        .pattern()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    bodies
        .into_iter()
        .rev()
        .find_map(|body| parse_string_list(body).ok())
}

/// 扫描文本中所有可解析的列表字面量，按出现顺序返回
///
/// 括号匹配会跳过字符串内部的 `[` `]`。解析成功的列表整体跳过，内部不再重复扫描。
pub fn scan_list_literals(text: &str) -> Vec<Vec<String>> {
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('[') {
        let start = pos + offset;
        if let Some(len) = matching_bracket(&text[start..]) {
            if let Ok(list) = parse_string_list(&text[start..start + len]) {
                found.push(list);
                pos = start + len;
                continue;
            }
        }
        pos = start + 1;
    }

    found
}

/// 返回与开头 `[` 配对的 `]` 之后的字节偏移
fn matching_bracket(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// 名单规整：去空白、去空项、按首次出现去重
pub fn normalize_names(names: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    names
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}
