//! 分层提取
//!
//! 层级按顺序尝试，第一个命中的层级决定结果。新增层级只需在 `TIERS` 中追加。

use crate::extraction::parser::{find_tagged, normalize_names, scan_list_literals, Marker};
use crate::models::{ExtractionResult, ExtractionTier, TranscriptEvent};

/// 单个层级的提取函数
pub type TierFn = fn(&[TranscriptEvent]) -> Option<Vec<String>>;

/// 提取层级，按优先级排列
pub const TIERS: &[(ExtractionTier, TierFn)] = &[
    (ExtractionTier::FinalTag, final_tag),
    (ExtractionTier::ProgressTag, progress_tag),
    (ExtractionTier::ScannedArray, scanned_array),
];

/// 从会话记录中提取创始人名单
///
/// 纯函数：同一份记录总是得到同一个结果。没有任何可解析列表时返回空结果（`ExtractionTier::None`）。
pub fn extract(events: &[TranscriptEvent]) -> ExtractionResult {
    for (tier, attempt) in TIERS {
        if let Some(names) = attempt(events) {
            return ExtractionResult {
                names: normalize_names(names),
                tier: *tier,
            };
        }
    }
    ExtractionResult::empty()
}

/// 判断单条模型输出是否给出了最终答案
pub fn final_answer(text: &str) -> Option<Vec<String>> {
    find_tagged(text, Marker::Final)
}

/// 从新到旧遍历模型文本
fn newest_texts(events: &[TranscriptEvent]) -> impl Iterator<Item = &str> {
    events.iter().rev().filter_map(TranscriptEvent::model_text)
}

fn final_tag(events: &[TranscriptEvent]) -> Option<Vec<String>> {
    newest_texts(events).find_map(|text| find_tagged(text, Marker::Final))
}

fn progress_tag(events: &[TranscriptEvent]) -> Option<Vec<String>> {
    newest_texts(events).find_map(|text| find_tagged(text, Marker::Progress))
}

/// 最新一条含列表的模型文本中，取最后一个列表
fn scanned_array(events: &[TranscriptEvent]) -> Option<Vec<String>> {
    newest_texts(events).find_map(|text| scan_list_literals(text).pop())
}
