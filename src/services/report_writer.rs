//! 结果写入服务 - 业务能力层
//!
//! 只负责把汇总报告写成 `公司名 -> 创始人列表` 的 JSON 文件，不关心流程

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::models::AggregateReport;

/// 结果写入服务
pub struct ReportWriter {
    output_path: PathBuf,
}

impl ReportWriter {
    pub fn new() -> Self {
        Self {
            output_path: PathBuf::from("founders.json"),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.output_path
    }

    /// 写入报告，保持输入顺序
    pub async fn write(&self, report: &AggregateReport) -> Result<()> {
        let map = report.to_founders_map();
        debug!(
            "写入结果: {} 个公司 -> {}",
            map.len(),
            self.output_path.display()
        );

        let json = serde_json::to_string_pretty(&map).context("无法序列化结果")?;

        if let Some(parent) = self.output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("无法创建目录: {}", parent.display()))?;
        }

        tokio::fs::write(&self.output_path, json + "\n")
            .await
            .with_context(|| format!("无法写入结果文件: {}", self.output_path.display()))?;

        Ok(())
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}
