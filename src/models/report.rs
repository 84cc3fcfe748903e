use serde::{Deserialize, Serialize};

use crate::models::{Record, TerminationStatus};

/// 命中的提取层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractionTier {
    /// `<final>` 标记
    FinalTag,
    /// `<progress>` 标记
    ProgressTag,
    /// 在文本中扫描到的列表字面量
    ScannedArray,
    /// 没有任何可解析的列表
    None,
}

/// 单个会话的提取结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// 去重后的创始人名单，保持首次出现顺序
    pub names: Vec<String>,
    pub tier: ExtractionTier,
}

impl ExtractionResult {
    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            tier: ExtractionTier::None,
        }
    }

    pub fn has_names(&self) -> bool {
        !self.names.is_empty()
    }
}

/// 汇总报告中的一项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub record: Record,
    pub status: TerminationStatus,
    pub turns_used: usize,
    pub result: ExtractionResult,
}

/// 按终止状态的计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub final_answer: usize,
    pub exhausted: usize,
    pub failed: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: TerminationStatus) {
        match status {
            TerminationStatus::Final => self.final_answer += 1,
            TerminationStatus::Exhausted => self.exhausted += 1,
            TerminationStatus::Failed => self.failed += 1,
        }
    }
}

/// 最终汇总报告
///
/// `entries` 与输入顺序一致。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub entries: Vec<ReportEntry>,
    /// 找到创始人的公司数
    pub succeeded: usize,
    /// 没找到创始人的公司数（含失败与轮数用尽后无结果）
    pub failed: usize,
    pub by_status: StatusCounts,
}

impl AggregateReport {
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// 输出格式：公司名 -> 创始人列表
    ///
    /// 重名公司保留首次出现的位置，值以最后一次为准。
    pub fn to_founders_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        for entry in &self.entries {
            map.insert(
                entry.record.identifier.clone(),
                serde_json::Value::from(entry.result.names.clone()),
            );
        }
        map
    }
}
