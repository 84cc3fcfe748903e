//! 提取引擎
//!
//! 把一次会话的原始记录变成结构化的创始人名单，不依赖任何外部服务。

pub mod parser;
pub mod tiers;

pub use parser::{find_tagged, normalize_names, parse_string_list, scan_list_literals, Marker};
pub use tiers::{extract, final_answer, TierFn, TIERS};
