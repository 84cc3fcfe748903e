//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量调研处理器
//! - 管理应用生命周期（初始化、运行）
//! - 加载公司列表，写出结果，输出全局统计
//!
//! ### `session_orchestrator` - 会话编排器
//! - 每个公司一个任务，全部同时派发
//! - 等待全部结束，按输入顺序返回 `Session`
//!
//! ### `aggregator` - 结果汇总器
//! - 对每个 `Session` 运行提取引擎
//! - 生成 `AggregateReport`
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Record>)
//!     ↓
//! session_orchestrator (并发运行 Vec<Session>)
//!     ↓
//! workflow::ConversationDriver (处理单个 Record)
//!     ↓
//! services (能力层：agent / tools / logger / writer)
//! ```

pub mod aggregator;
pub mod batch_processor;
pub mod session_orchestrator;

pub use aggregator::aggregate;
pub use batch_processor::App;
pub use session_orchestrator::SessionOrchestrator;
