//! 会话上下文
//!
//! 封装"我正在处理第几个公司"这一信息，只用于日志

use std::fmt::Display;

/// 会话上下文
#[derive(Debug, Clone)]
pub struct SessionCtx {
    /// 公司名称
    pub identifier: String,

    /// 在输入中的序号（从1开始）
    pub index: usize,

    /// 公司总数
    pub total: usize,
}

impl SessionCtx {
    pub fn new(identifier: impl Into<String>, index: usize, total: usize) -> Self {
        Self {
            identifier: identifier.into(),
            index,
            total,
        }
    }
}

impl Display for SessionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}/{} {}]", self.index, self.total, self.identifier)
    }
}
