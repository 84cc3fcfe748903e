//! OpenAI 兼容的 Agent 服务 - 业务能力层
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 调用 chat completions
//! - 工具以 function 形式声明，由 `ToolRunner` 在本轮内执行
//! - 兼容 OpenAI API 的服务（网关、代理等）
//!
//! 一轮 = 若干次"模型请求工具 → 执行工具 → 回传结果"，直到模型给出文本。
//! 工具往返次数超过上限时，最后一次请求不再提供工具，迫使模型直接回答。
//! 模型在请求工具时顺带给出的文字会并入本轮最终的模型文本。
//!
//! 历史中助手消息携带的工具往返会被还原成 `tool_calls` + `Tool` 消息。

use std::sync::Arc;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionTools,
        CreateChatCompletionRequestArgs, FunctionCall, FunctionObjectArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AgentError, ToolError};
use crate::models::{EventKind, ToolKind};
use crate::services::agent_service::{AgentRequest, AgentService, ChatMessage, Role, ToolExchange};
use crate::services::web_tools::{ToolRunner, WebTools};

/// OpenAI 兼容的 Agent 服务
pub struct OpenAiAgentService {
    client: Client<OpenAIConfig>,
    tool_runner: Arc<dyn ToolRunner>,
    max_tool_rounds: usize,
}

impl OpenAiAgentService {
    /// 使用默认的网页工具创建服务
    pub fn new(config: &Config) -> Self {
        Self::with_tool_runner(config, Arc::new(WebTools::new(config)))
    }

    /// 使用自定义工具执行器创建服务
    pub fn with_tool_runner(config: &Config, tool_runner: Arc<dyn ToolRunner>) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            tool_runner,
            max_tool_rounds: config.max_tool_rounds,
        }
    }

    /// 系统消息 + 历史消息
    fn base_messages(
        &self,
        request: &AgentRequest<'_>,
    ) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        let mut messages = Vec::with_capacity(request.history.len() + 1);

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_prompt)
            .build()
            .map_err(request_error)?;
        messages.push(ChatCompletionRequestMessage::System(system_msg));

        for (index, message) in request.history.iter().enumerate() {
            messages.extend(to_request_messages(index, message)?);
        }

        Ok(messages)
    }

    /// 执行一次工具调用，返回 (输出, 是否出错)
    async fn invoke(
        &self,
        tool: ToolKind,
        input: &serde_json::Value,
        permitted: &[ToolKind],
    ) -> (String, bool) {
        let result = if permitted.contains(&tool) {
            self.tool_runner.run(tool, input).await
        } else {
            Err(ToolError::NotPermitted(tool.name().to_string()))
        };

        match result {
            Ok(output) => (output, false),
            Err(e) => {
                warn!("⚠️ 工具 {} 调用失败: {}", tool, e);
                (e.to_string(), true)
            }
        }
    }

    /// 处理模型的一次 function 调用
    ///
    /// 返回需要记录的事件，以及回传给模型的工具消息内容。
    async fn execute_call(
        &self,
        name: &str,
        raw_arguments: &str,
        permitted: &[ToolKind],
    ) -> (Vec<EventKind>, String) {
        let input = parse_arguments(raw_arguments);

        match name.parse::<ToolKind>() {
            Ok(tool) => {
                let (output, is_error) = self.invoke(tool, &input, permitted).await;
                let events = vec![
                    EventKind::ToolInvocation { tool, input },
                    EventKind::ToolResult {
                        tool,
                        output: output.clone(),
                        is_error,
                    },
                ];
                (events, output)
            }
            Err(_) => {
                warn!("⚠️ 模型请求了未知工具: {}", name);
                let reason = format!("未知工具: {}", name);
                let event = EventKind::ToolRejected {
                    name: name.to_string(),
                    input,
                    reason: reason.clone(),
                };
                (vec![event], reason)
            }
        }
    }

    /// 区分网络错误与服务端错误
    fn classify(&self, model: &str, err: OpenAIError) -> AgentError {
        match err {
            OpenAIError::ApiError(api) => AgentError::Service {
                model: model.to_string(),
                message: api.message,
            },
            e @ OpenAIError::JSONDeserialize(..) => AgentError::MalformedResponse(e.to_string()),
            other => AgentError::Transport {
                model: model.to_string(),
                message: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl AgentService for OpenAiAgentService {
    async fn run_turn(&self, request: AgentRequest<'_>) -> Result<Vec<EventKind>, AgentError> {
        let mut messages = self.base_messages(&request)?;
        let tools = build_tools(request.tools)?;
        let mut events = Vec::new();
        // 请求工具时顺带给出的文字
        let mut notes: Vec<String> = Vec::new();

        for round in 0..=self.max_tool_rounds {
            let allow_tools = round < self.max_tool_rounds && !tools.is_empty();
            debug!(
                "调用 Agent API，模型: {}，第 {} 次请求，消息数: {}",
                request.model,
                round + 1,
                messages.len()
            );

            let built = if allow_tools {
                CreateChatCompletionRequestArgs::default()
                    .model(request.model)
                    .messages(messages.clone())
                    .tools(tools.clone())
                    .build()
            } else {
                CreateChatCompletionRequestArgs::default()
                    .model(request.model)
                    .messages(messages.clone())
                    .build()
            };
            let chat_request = built.map_err(request_error)?;

            let response = self
                .client
                .chat()
                .create(chat_request)
                .await
                .map_err(|e| self.classify(request.model, e))?;

            let message = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| AgentError::MalformedResponse("choices 为空".to_string()))?
                .message;

            let tool_calls: Vec<ChatCompletionMessageToolCall> = message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .filter_map(|call| match call {
                    ChatCompletionMessageToolCalls::Function(call) => Some(call),
                    _ => None,
                })
                .collect();

            let content = message.content.filter(|c| !c.trim().is_empty());

            if tool_calls.is_empty() || !allow_tools {
                events.push(EventKind::model_text(turn_text(notes, content)));
                return Ok(events);
            }

            let assistant_msg =
                assistant_tool_call_message(content.clone(), tool_calls.iter().cloned())?;
            messages.push(ChatCompletionRequestMessage::Assistant(assistant_msg));
            notes.extend(content);

            for call in tool_calls {
                let (call_events, output) = self
                    .execute_call(&call.function.name, &call.function.arguments, request.tools)
                    .await;
                events.extend(call_events);

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(call.id.clone())
                    .content(output)
                    .build()
                    .map_err(request_error)?;
                messages.push(ChatCompletionRequestMessage::Tool(tool_msg));
            }
        }

        Err(AgentError::MalformedResponse(
            "工具往返次数超过上限".to_string(),
        ))
    }
}

/// 本轮的模型文本：先前顺带给出的文字在前，最终回复在后
fn turn_text(mut notes: Vec<String>, content: Option<String>) -> String {
    notes.extend(content);
    notes.join("\n\n")
}

fn request_error(err: OpenAIError) -> AgentError {
    AgentError::Request(err.to_string())
}

/// 带工具调用的助手消息，有文字时一并带上
fn assistant_tool_call_message(
    content: Option<String>,
    calls: impl IntoIterator<Item = ChatCompletionMessageToolCall>,
) -> Result<ChatCompletionRequestAssistantMessage, AgentError> {
    let mut args = ChatCompletionRequestAssistantMessageArgs::default();
    args.tool_calls(
        calls
            .into_iter()
            .map(ChatCompletionMessageToolCalls::Function)
            .collect::<Vec<_>>(),
    );
    if let Some(content) = content {
        args.content(content);
    }
    args.build().map_err(request_error)
}

/// 历史消息转为请求消息
///
/// 带工具往返的助手消息展开为：助手 `tool_calls` → 每个调用一条 `Tool` 消息 → 助手文本。
/// 调用 id 由历史位置生成，保证同一请求内唯一。
fn to_request_messages(
    index: usize,
    message: &ChatMessage,
) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
    let mut out = Vec::with_capacity(message.tool_exchanges.len() + 2);

    match message.role {
        Role::User => out.push(ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.as_str())
                .build()
                .map_err(request_error)?,
        )),
        Role::Assistant => {
            if !message.tool_exchanges.is_empty() {
                let ids: Vec<String> = (0..message.tool_exchanges.len())
                    .map(|j| format!("call_h{}_{}", index, j))
                    .collect();

                let calls = message
                    .tool_exchanges
                    .iter()
                    .zip(&ids)
                    .map(|(exchange, id)| replayed_call(id, exchange));
                out.push(ChatCompletionRequestMessage::Assistant(
                    assistant_tool_call_message(None, calls)?,
                ));

                for (exchange, id) in message.tool_exchanges.iter().zip(ids) {
                    out.push(ChatCompletionRequestMessage::Tool(
                        ChatCompletionRequestToolMessageArgs::default()
                            .tool_call_id(id)
                            .content(exchange.output.as_str())
                            .build()
                            .map_err(request_error)?,
                    ));
                }
            }

            out.push(ChatCompletionRequestMessage::Assistant(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.content.as_str())
                    .build()
                    .map_err(request_error)?,
            ));
        }
    }

    Ok(out)
}

fn replayed_call(id: &str, exchange: &ToolExchange) -> ChatCompletionMessageToolCall {
    ChatCompletionMessageToolCall {
        id: id.to_string(),
        function: FunctionCall {
            name: exchange.name.clone(),
            arguments: exchange.input.to_string(),
        },
    }
}

/// 把允许的工具声明为 function
fn build_tools(tools: &[ToolKind]) -> Result<Vec<ChatCompletionTools>, AgentError> {
    tools
        .iter()
        .map(|tool| {
            let function = FunctionObjectArgs::default()
                .name(tool.name())
                .description(tool.description())
                .parameters(tool.parameters())
                .build()
                .map_err(request_error)?;
            Ok(ChatCompletionTools::Function(ChatCompletionTool { function }))
        })
        .collect()
}

/// 工具参数不是合法 JSON 时保留原文，交给工具自己报错
fn parse_arguments(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::json!({ "raw": raw }))
}
