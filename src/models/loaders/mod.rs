pub mod record_loader;

pub use record_loader::{load_records, parse_records};
