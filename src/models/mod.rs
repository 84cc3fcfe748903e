pub mod loaders;
pub mod record;
pub mod report;
pub mod tool;
pub mod transcript;

pub use loaders::load_records;
pub use record::Record;
pub use report::{AggregateReport, ExtractionResult, ExtractionTier, ReportEntry, StatusCounts};
pub use tool::ToolKind;
pub use transcript::{EventKind, Session, TerminationStatus, TranscriptEvent};
