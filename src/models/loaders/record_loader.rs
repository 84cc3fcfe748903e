use crate::models::Record;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从文本文件加载待调研的公司列表
///
/// 每行一个公司，格式为 `公司名 (https://url)`，空行跳过。
pub async fn load_records(file_path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let file_path = file_path.as_ref();

    if !file_path.exists() {
        anyhow::bail!("输入文件不存在: {}", file_path.display());
    }

    let content = fs::read_to_string(file_path)
        .await
        .with_context(|| format!("无法读取输入文件: {}", file_path.display()))?;

    let records = parse_records(&content);
    tracing::info!(
        "成功加载 {} 个公司 ({})",
        records.len(),
        file_path.file_name().unwrap_or_default().to_string_lossy()
    );

    Ok(records)
}

/// 解析整个输入文本
pub fn parse_records(content: &str) -> Vec<Record> {
    content.lines().filter_map(Record::parse_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_records_skips_empty_lines() {
        let records = parse_records("Airbnb (https://www.airbnb.com/)\n\nDropbox (https://www.dropbox.com/)\n");
        assert_eq!(
            records,
            vec![
                Record::new("Airbnb", "https://www.airbnb.com/"),
                Record::new("Dropbox", "https://www.dropbox.com/"),
            ]
        );
    }

    #[tokio::test]
    async fn test_load_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Read AI (https://www.read.ai/)").unwrap();
        writeln!(file, "Casium").unwrap();

        let records = load_records(file.path()).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].identifier, "Read AI");
        assert_eq!(records[1], Record::new("Casium", ""));
    }

    #[tokio::test]
    async fn test_load_records_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_records(dir.path().join("missing.txt")).await;
        assert!(result.is_err());
    }
}
