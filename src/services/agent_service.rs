//! Agent 服务边界 - 业务能力层
//!
//! 只描述"跑一轮对话"这一能力：传入历史、系统提示、工具集合和模型，
//! 返回若干工具事件加一条模型文本，或者一个错误。

use async_trait::async_trait;

use crate::error::AgentError;
use crate::models::{EventKind, ToolKind};

/// 对话历史中的角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// 一次已完成的工具往返（调用 + 结果）
#[derive(Debug, Clone, PartialEq)]
pub struct ToolExchange {
    /// 模型请求的工具名，可能不是已知工具
    pub name: String,
    pub input: serde_json::Value,
    pub output: String,
    pub is_error: bool,
}

impl ToolExchange {
    /// 把一轮的事件配对成工具往返
    ///
    /// `ToolInvocation` 与其后的 `ToolResult` 配成一对；`ToolRejected` 自成一对。
    /// 没有结果的调用不计入。
    pub fn from_events(events: &[EventKind]) -> Vec<ToolExchange> {
        let mut exchanges = Vec::new();
        let mut pending: Option<(String, &serde_json::Value)> = None;

        for event in events {
            match event {
                EventKind::ToolInvocation { tool, input } => {
                    pending = Some((tool.name().to_string(), input));
                }
                EventKind::ToolResult {
                    output, is_error, ..
                } => {
                    if let Some((name, input)) = pending.take() {
                        exchanges.push(ToolExchange {
                            name,
                            input: input.clone(),
                            output: output.clone(),
                            is_error: *is_error,
                        });
                    }
                }
                EventKind::ToolRejected {
                    name,
                    input,
                    reason,
                } => exchanges.push(ToolExchange {
                    name: name.clone(),
                    input: input.clone(),
                    output: reason.clone(),
                    is_error: true,
                }),
                EventKind::ModelText { .. } => {}
            }
        }

        exchanges
    }
}

/// 对话历史中的一条消息
///
/// 助手消息带着本轮的工具往返，下一轮请求时原样回放给模型。
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub tool_exchanges: Vec<ToolExchange>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_exchanges: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_exchanges: Vec::new(),
        }
    }

    /// 一轮的助手回复：工具往返在前，文本在后
    pub fn assistant_turn(content: impl Into<String>, tool_exchanges: Vec<ToolExchange>) -> Self {
        Self {
            tool_exchanges,
            ..Self::assistant(content)
        }
    }
}

/// 单轮请求
#[derive(Debug, Clone, Copy)]
pub struct AgentRequest<'a> {
    pub system_prompt: &'a str,
    pub history: &'a [ChatMessage],
    pub tools: &'a [ToolKind],
    pub model: &'a str,
}

/// Agent 服务
///
/// 一轮的返回值必须以恰好一条 `ModelText` 结尾，中间只能是工具事件；
/// 调用方负责校验。
#[async_trait]
pub trait AgentService: Send + Sync {
    async fn run_turn(&self, request: AgentRequest<'_>) -> Result<Vec<EventKind>, AgentError>;
}

/// 校验一轮返回的事件序列，成功时返回模型文本
pub fn validate_turn(events: &[EventKind]) -> Result<&str, AgentError> {
    let text_count = events.iter().filter(|e| e.is_model_text()).count();
    match events.last() {
        Some(EventKind::ModelText { text }) if text_count == 1 => Ok(text.as_str()),
        Some(_) if text_count == 0 => Err(AgentError::MalformedResponse(
            "本轮没有模型文本".to_string(),
        )),
        None => Err(AgentError::MalformedResponse("本轮返回为空".to_string())),
        Some(_) => Err(AgentError::MalformedResponse(format!(
            "本轮模型文本数量为 {} 或不在末尾",
            text_count
        ))),
    }
}
