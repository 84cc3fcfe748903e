//! # Founder Finder
//!
//! 批量调研公司创始人：为每个公司同时运行一次有界的 agent 对话，
//! 再从不一定规整的回复中提取创始人名单。
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - `Record` / `TranscriptEvent` / `Session` / `AggregateReport`
//!
//! ### ② 提取引擎（Extraction）
//! - `extraction/` - 纯函数，按 final → progress → 扫描 的顺序逐层尝试
//!
//! ### ③ 业务能力层（Services）
//! - `AgentService` - 跑一轮对话的能力（`OpenAiAgentService` 为默认实现）
//! - `WebTools` - WebSearch / WebFetch
//! - `TranscriptLogger` - 会话事件实时转发
//! - `ReportWriter` - 写结果 JSON
//!
//! ### ④ 流程层（Workflow）
//! - `ConversationDriver` - 单个公司的轮次控制（Running → Final / Exhausted / Failed）
//!
//! ### ⑤ 编排层（Orchestration）
//! - `SessionOrchestrator` - 并发派发与等待
//! - `aggregate` - 汇总与统计
//! - `App` - 批量入口

pub mod config;
pub mod error;
pub mod extraction;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AgentError, ParseError, ToolError};
pub use extraction::extract;
pub use models::{
    AggregateReport, EventKind, ExtractionResult, ExtractionTier, Record, Session,
    TerminationStatus, ToolKind, TranscriptEvent,
};
pub use orchestrator::{aggregate, App, SessionOrchestrator};
pub use workflow::{ConversationDriver, DriverSettings, SessionCtx};
