//! 会话记录
//!
//! `TranscriptEvent` 是 agent 服务返回内容的封闭枚举，`Session` 是一次有界对话的完整结果。

use serde::{Deserialize, Serialize};

use crate::models::{Record, ToolKind};

/// 会话事件内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// 模型发起工具调用
    ToolInvocation {
        tool: ToolKind,
        input: serde_json::Value,
    },
    /// 工具返回结果（失败时 `is_error` 为 true）
    ToolResult {
        tool: ToolKind,
        output: String,
        is_error: bool,
    },
    /// 模型请求了不存在的工具，调用未执行
    ToolRejected {
        name: String,
        input: serde_json::Value,
        reason: String,
    },
    /// 模型文本输出，每轮恰好一条且位于最后
    ModelText { text: String },
}

impl EventKind {
    pub fn model_text(text: impl Into<String>) -> Self {
        EventKind::ModelText { text: text.into() }
    }

    pub fn is_model_text(&self) -> bool {
        matches!(self, EventKind::ModelText { .. })
    }
}

/// 带轮次编号的会话事件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    /// 轮次（从 1 开始）
    pub turn: usize,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl TranscriptEvent {
    pub fn new(turn: usize, kind: EventKind) -> Self {
        Self { turn, kind }
    }

    /// 模型文本内容；其他事件返回 `None`
    pub fn model_text(&self) -> Option<&str> {
        match &self.kind {
            EventKind::ModelText { text } => Some(text),
            EventKind::ToolInvocation { .. }
            | EventKind::ToolResult { .. }
            | EventKind::ToolRejected { .. } => None,
        }
    }
}

/// 会话终止状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationStatus {
    /// 模型给出了最终答案标记
    Final,
    /// 轮数用尽仍未给出最终答案
    Exhausted,
    /// 服务调用失败
    Failed,
}

impl TerminationStatus {
    pub fn label(self) -> &'static str {
        match self {
            TerminationStatus::Final => "最终答案",
            TerminationStatus::Exhausted => "轮数用尽",
            TerminationStatus::Failed => "失败",
        }
    }
}

/// 一次有界对话的结果
///
/// 由 `ConversationDriver` 独占构建，终止后按值交给汇总器。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub record: Record,
    /// 只追加，不重排
    pub events: Vec<TranscriptEvent>,
    /// 已用轮数，不超过配置上限
    pub turns_used: usize,
    pub status: TerminationStatus,
    /// `Failed` 时的错误信息
    pub error: Option<String>,
}

impl Session {
    /// 直接构造一个失败会话（例如任务 panic）
    pub fn failed(record: Record, error: impl Into<String>) -> Self {
        Self {
            record,
            events: Vec::new(),
            turns_used: 0,
            status: TerminationStatus::Failed,
            error: Some(error.into()),
        }
    }

    /// 按时间顺序遍历模型文本
    pub fn model_texts(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.events.iter().filter_map(TranscriptEvent::model_text)
    }

    /// 工具调用次数
    pub fn tool_invocations(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e.kind, EventKind::ToolInvocation { .. }))
            .count()
    }
}
