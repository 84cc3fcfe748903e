pub mod conversation;
pub mod prompts;
pub mod session_ctx;

pub use conversation::{ConversationDriver, DriverSettings};
pub use session_ctx::SessionCtx;
