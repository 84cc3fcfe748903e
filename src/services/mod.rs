pub mod agent_service;
pub mod openai_agent;
pub mod report_writer;
pub mod transcript_logger;
pub mod web_tools;

pub use agent_service::{
    validate_turn, AgentRequest, AgentService, ChatMessage, Role, ToolExchange,
};
pub use openai_agent::OpenAiAgentService;
pub use report_writer::ReportWriter;
pub use transcript_logger::{
    FanoutLogger, FileTranscriptLogger, TracingTranscriptLogger, TranscriptLogger,
};
pub use web_tools::{ToolRunner, WebTools};
