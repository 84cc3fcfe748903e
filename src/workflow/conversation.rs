//! 会话驱动 - 流程层
//!
//! 核心职责：为"一个公司"跑完一次有界对话
//!
//! 状态流转：
//! 1. Running → 每轮提交历史，收到若干工具事件 + 一条模型文本
//! 2. 模型文本中出现 `<final>[...]</final>` → Final，立即停止
//! 3. 轮数达到上限 → Exhausted
//! 4. 服务报错或响应格式不对 → Failed，不重试
//!
//! 历史中的助手消息带着本轮的工具往返，后续轮次能看到之前取得的资料。
//!
//! 失败只记录在 `Session` 上，不会向上抛出。

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AgentError;
use crate::extraction::final_answer;
use crate::models::{Record, Session, TerminationStatus, ToolKind, TranscriptEvent};
use crate::services::{
    validate_turn, AgentRequest, AgentService, ChatMessage, ToolExchange, TranscriptLogger,
};
use crate::utils::logging::truncate_text;
use crate::workflow::prompts::{self, CONTINUE_PROMPT, INITIAL_PROMPT_TEMPLATE};
use crate::workflow::session_ctx::SessionCtx;

/// 会话驱动的固定参数，构造后不再变化
#[derive(Debug, Clone)]
pub struct DriverSettings {
    /// 最大轮数
    pub max_turns: usize,
    /// 允许的工具
    pub tools: Vec<ToolKind>,
    /// 模型标识
    pub model: String,
    /// 系统提示模板
    pub system_prompt_template: String,
}

impl DriverSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_turns: config.max_turns,
            tools: config.allowed_tools.clone(),
            model: config.llm_model_name.clone(),
            system_prompt_template: prompts::SYSTEM_PROMPT_TEMPLATE.to_string(),
        }
    }
}

/// 会话驱动
///
/// - 每次 `run` 独占自己的 `Session`，多个 `run` 之间没有共享的可变状态
/// - 只依赖 agent 服务和会话日志两个协作者
#[derive(Clone)]
pub struct ConversationDriver {
    agent: Arc<dyn AgentService>,
    logger: Arc<dyn TranscriptLogger>,
    settings: Arc<DriverSettings>,
}

impl ConversationDriver {
    pub fn new(
        agent: Arc<dyn AgentService>,
        logger: Arc<dyn TranscriptLogger>,
        settings: DriverSettings,
    ) -> Self {
        Self {
            agent,
            logger,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    /// 跑完一个公司的对话，总是返回一个终止状态的 `Session`
    pub async fn run(&self, record: Record, ctx: &SessionCtx) -> Session {
        let system_prompt = prompts::render(&self.settings.system_prompt_template, &record);
        let mut history = vec![ChatMessage::user(prompts::render(
            INITIAL_PROMPT_TEMPLATE,
            &record,
        ))];

        let mut session = Session {
            record,
            events: Vec::new(),
            turns_used: 0,
            status: TerminationStatus::Exhausted,
            error: None,
        };

        info!("{} 🚀 开始调研 ({})", ctx, session.record);

        while session.turns_used < self.settings.max_turns {
            let turn = session.turns_used + 1;
            let request = AgentRequest {
                system_prompt: &system_prompt,
                history: &history,
                tools: &self.settings.tools,
                model: &self.settings.model,
            };

            let reply = match self.agent.run_turn(request).await {
                Ok(reply) => reply,
                Err(e) => return self.fail(session, ctx, e),
            };

            let checked = validate_turn(&reply).map(str::to_string);
            let exchanges = ToolExchange::from_events(&reply);
            for kind in reply {
                self.record_event(&mut session, ctx, TranscriptEvent::new(turn, kind));
            }

            let text = match checked {
                Ok(text) => text,
                Err(e) => return self.fail(session, ctx, e),
            };
            session.turns_used = turn;

            if let Some(names) = final_answer(&text) {
                session.status = TerminationStatus::Final;
                info!(
                    "{} ✓ 第 {} 轮给出最终答案: {} 位创始人",
                    ctx,
                    turn,
                    names.len()
                );
                return session;
            }

            history.push(ChatMessage::assistant_turn(text, exchanges));
            history.push(ChatMessage::user(CONTINUE_PROMPT));
        }

        warn!(
            "{} ⚠️ 已用完 {} 轮仍未给出最终答案",
            ctx, self.settings.max_turns
        );
        session
    }

    /// 先转发日志再追加，日志失败不影响会话
    fn record_event(&self, session: &mut Session, ctx: &SessionCtx, event: TranscriptEvent) {
        if let Err(e) = self.logger.log_event(&session.record.identifier, &event) {
            warn!("{} ⚠️ 会话日志写入失败: {}", ctx, e);
        }
        session.events.push(event);
    }

    fn fail(&self, mut session: Session, ctx: &SessionCtx, err: AgentError) -> Session {
        error!(
            "{} ❌ 第 {} 轮失败: {}",
            ctx,
            session.turns_used + 1,
            truncate_text(&err.to_string(), 200)
        );
        session.status = TerminationStatus::Failed;
        session.error = Some(err.to_string());
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoggerError;
    use crate::models::EventKind;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// 按顺序返回预设回复
    struct ScriptedAgent {
        replies: Mutex<VecDeque<Result<Vec<EventKind>, AgentError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedAgent {
        fn new(replies: Vec<Result<Vec<EventKind>, AgentError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AgentService for ScriptedAgent {
        async fn run_turn(&self, _request: AgentRequest<'_>) -> Result<Vec<EventKind>, AgentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(vec![EventKind::model_text("still searching")]))
        }
    }

    /// 记录每轮收到的历史
    struct RecordingAgent {
        inner: Arc<ScriptedAgent>,
        histories: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl AgentService for RecordingAgent {
        async fn run_turn(&self, request: AgentRequest<'_>) -> Result<Vec<EventKind>, AgentError> {
            self.histories.lock().unwrap().push(request.history.to_vec());
            self.inner.run_turn(request).await
        }
    }

    /// 记录转发次数的日志
    #[derive(Default)]
    struct CountingLogger {
        seen: AtomicUsize,
        fail: bool,
    }

    impl TranscriptLogger for CountingLogger {
        fn log_event(&self, _: &str, _: &TranscriptEvent) -> Result<(), LoggerError> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LoggerError::WriteFailed {
                    path: "test".to_string(),
                    source: std::io::Error::other("broken"),
                });
            }
            Ok(())
        }
    }

    fn settings(max_turns: usize) -> DriverSettings {
        DriverSettings {
            max_turns,
            tools: vec![ToolKind::WebSearch, ToolKind::WebFetch],
            model: "test-model".to_string(),
            system_prompt_template: prompts::SYSTEM_PROMPT_TEMPLATE.to_string(),
        }
    }

    fn ctx() -> SessionCtx {
        SessionCtx::new("Acme", 1, 1)
    }

    fn search() -> EventKind {
        EventKind::ToolInvocation {
            tool: ToolKind::WebSearch,
            input: serde_json::json!({"query": "Acme founders"}),
        }
    }

    #[tokio::test]
    async fn test_final_marker_stops_immediately() {
        let agent = ScriptedAgent::new(vec![
            Ok(vec![search(), EventKind::model_text("looking")]),
            Ok(vec![EventKind::model_text(r#"<final>["Jane Doe"]</final>"#)]),
        ]);
        let logger = Arc::new(CountingLogger::default());
        let driver = ConversationDriver::new(agent.clone(), logger.clone(), settings(10));

        let session = driver.run(Record::new("Acme", "acme.example"), &ctx()).await;

        assert_eq!(session.status, TerminationStatus::Final);
        assert_eq!(session.turns_used, 2);
        assert_eq!(agent.calls(), 2);
        assert_eq!(session.events.len(), 3);
        assert_eq!(session.events[0].turn, 1);
        assert_eq!(session.events[2].turn, 2);
        assert_eq!(logger.seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_is_not_failure() {
        let agent = ScriptedAgent::new(vec![Ok(vec![EventKind::model_text(
            r#"<progress>["A Person"]</progress>"#,
        )])]);
        let driver = ConversationDriver::new(agent.clone(), Arc::new(CountingLogger::default()), settings(3));

        let session = driver.run(Record::new("Acme", ""), &ctx()).await;

        assert_eq!(session.status, TerminationStatus::Exhausted);
        assert_eq!(session.turns_used, 3);
        assert_eq!(agent.calls(), 3);
        assert!(session.error.is_none());
    }

    #[tokio::test]
    async fn test_zero_turn_budget_issues_no_requests() {
        let agent = ScriptedAgent::new(Vec::new());
        let driver = ConversationDriver::new(agent.clone(), Arc::new(CountingLogger::default()), settings(0));

        let session = driver.run(Record::new("Acme", ""), &ctx()).await;

        assert_eq!(session.status, TerminationStatus::Exhausted);
        assert_eq!(session.turns_used, 0);
        assert_eq!(agent.calls(), 0);
        assert!(session.events.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_fails_without_retry() {
        let agent = ScriptedAgent::new(vec![
            Ok(vec![EventKind::model_text(r#"<progress>["A"]</progress>"#)]),
            Err(AgentError::Transport {
                model: "test-model".to_string(),
                message: "connection reset".to_string(),
            }),
        ]);
        let driver = ConversationDriver::new(agent.clone(), Arc::new(CountingLogger::default()), settings(10));

        let session = driver.run(Record::new("Acme", ""), &ctx()).await;

        assert_eq!(session.status, TerminationStatus::Failed);
        assert_eq!(session.turns_used, 1);
        assert_eq!(agent.calls(), 2);
        assert!(session.error.unwrap().contains("connection reset"));
        assert_eq!(session.events.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_keeps_partial_events() {
        let agent = ScriptedAgent::new(vec![Ok(vec![search()])]);
        let driver = ConversationDriver::new(agent.clone(), Arc::new(CountingLogger::default()), settings(10));

        let session = driver.run(Record::new("Acme", ""), &ctx()).await;

        assert_eq!(session.status, TerminationStatus::Failed);
        assert_eq!(session.turns_used, 0);
        assert_eq!(session.events.len(), 1);
    }

    #[tokio::test]
    async fn test_logger_failure_does_not_affect_session() {
        let agent = ScriptedAgent::new(vec![Ok(vec![EventKind::model_text(
            r#"<final>["Jane Doe"]</final>"#,
        )])]);
        let logger = Arc::new(CountingLogger {
            seen: AtomicUsize::new(0),
            fail: true,
        });
        let driver = ConversationDriver::new(agent, logger.clone(), settings(10));

        let session = driver.run(Record::new("Acme", ""), &ctx()).await;

        assert_eq!(session.status, TerminationStatus::Final);
        assert_eq!(session.events.len(), 1);
        assert_eq!(logger.seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unparseable_final_tag_keeps_going() {
        let agent = ScriptedAgent::new(vec![
            Ok(vec![EventKind::model_text("<final>Jane Doe</final>")]),
            Ok(vec![EventKind::model_text(r#"<final>["Jane Doe"]</final>"#)]),
        ]);
        let driver = ConversationDriver::new(agent.clone(), Arc::new(CountingLogger::default()), settings(10));

        let session = driver.run(Record::new("Acme", ""), &ctx()).await;

        assert_eq!(session.status, TerminationStatus::Final);
        assert_eq!(session.turns_used, 2);
    }

    #[tokio::test]
    async fn test_next_turn_sees_previous_tool_output() {
        let agent = Arc::new(RecordingAgent {
            inner: ScriptedAgent::new(vec![
                Ok(vec![
                    EventKind::ToolInvocation {
                        tool: ToolKind::WebFetch,
                        input: serde_json::json!({"url": "https://acme.example/about"}),
                    },
                    EventKind::ToolResult {
                        tool: ToolKind::WebFetch,
                        output: "ABOUT PAGE: founded by Jane Doe".to_string(),
                        is_error: false,
                    },
                    EventKind::model_text("Let me keep checking."),
                ]),
                Ok(vec![EventKind::model_text(r#"<final>["Jane Doe"]</final>"#)]),
            ]),
            histories: Mutex::new(Vec::new()),
        });
        let driver = ConversationDriver::new(agent.clone(), Arc::new(CountingLogger::default()), settings(10));

        let session = driver.run(Record::new("Acme", "acme.example"), &ctx()).await;
        assert_eq!(session.status, TerminationStatus::Final);

        let histories = agent.histories.lock().unwrap();
        assert_eq!(histories.len(), 2);
        assert_eq!(histories[0].len(), 1);

        let second = &histories[1];
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].content, "Let me keep checking.");
        assert_eq!(second[1].tool_exchanges.len(), 1);
        let exchange = &second[1].tool_exchanges[0];
        assert_eq!(exchange.name, "WebFetch");
        assert_eq!(exchange.input["url"], "https://acme.example/about");
        assert_eq!(exchange.output, "ABOUT PAGE: founded by Jane Doe");
        assert_eq!(second[2].content, CONTINUE_PROMPT);
    }
}
