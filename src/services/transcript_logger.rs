//! 会话日志服务 - 业务能力层
//!
//! 每个事件产生时立刻转发，即使会话随后失败，之前的进度也能看到。
//! 日志写入失败只会被调用方记录下来，不影响会话本身。

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::error::LoggerError;
use crate::models::{EventKind, TranscriptEvent};
use crate::utils::logging::truncate_text;

/// 会话日志
pub trait TranscriptLogger: Send + Sync {
    /// 记录某个公司的一条会话事件
    fn log_event(&self, identifier: &str, event: &TranscriptEvent) -> Result<(), LoggerError>;
}

/// 输出到 tracing 的实时进度
#[derive(Debug, Default, Clone)]
pub struct TracingTranscriptLogger {
    verbose: bool,
}

impl TracingTranscriptLogger {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl TranscriptLogger for TracingTranscriptLogger {
    fn log_event(&self, identifier: &str, event: &TranscriptEvent) -> Result<(), LoggerError> {
        match &event.kind {
            EventKind::ToolInvocation { tool, input } => {
                let target = input
                    .get("query")
                    .or_else(|| input.get("url"))
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                info!("[{}] 🔧 第 {} 轮 {}: {}", identifier, event.turn, tool, target);
            }
            EventKind::ToolResult {
                tool,
                output,
                is_error,
            } => {
                if *is_error {
                    info!("[{}] ✗ {} 出错: {}", identifier, tool, truncate_text(output, 120));
                } else {
                    debug!("[{}] ✓ {} 返回 {} 字符", identifier, tool, output.chars().count());
                }
            }
            EventKind::ToolRejected { name, reason, .. } => {
                warn!("[{}] ✗ 第 {} 轮 {} 被拒绝: {}", identifier, event.turn, name, reason);
            }
            EventKind::ModelText { text } => {
                info!(
                    "[{}] 💬 第 {} 轮模型回复 ({} 字符)",
                    identifier,
                    event.turn,
                    text.chars().count()
                );
                if self.verbose {
                    info!("[{}]    {}", identifier, truncate_text(text, 200));
                }
            }
        }
        Ok(())
    }
}

/// 每个公司一个日志文件
///
/// 文件名为 `<公司名，空格替换为下划线>_conversation.log`，同名公司共用一个文件。
/// 所有追加在一把锁下串行执行，表头只写一次，各事件不会交错。
/// 写入是同步的小块 I/O，直接在调用线程上完成。
pub struct FileTranscriptLogger {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTranscriptLogger {
    /// 创建日志目录
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, LoggerError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| LoggerError::WriteFailed {
            path: dir.display().to_string(),
            source,
        })?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// 某个公司的日志文件路径
    pub fn path_for(&self, identifier: &str) -> PathBuf {
        self.dir.join(format!("{}_conversation.log", file_stem(identifier)))
    }

    fn append(&self, path: &Path, line: &str) -> Result<(), LoggerError> {
        // 其他线程 panic 不影响文件本身，继续使用
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let write = || -> std::io::Result<()> {
            let is_new = !path.exists();
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            if is_new {
                writeln!(
                    file,
                    "{}\n会话日志 - {}\n{}",
                    "=".repeat(60),
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                    "=".repeat(60)
                )?;
            }
            file.write_all(line.as_bytes())
        };

        write().map_err(|source| LoggerError::WriteFailed {
            path: path.display().to_string(),
            source,
        })
    }
}

impl TranscriptLogger for FileTranscriptLogger {
    fn log_event(&self, identifier: &str, event: &TranscriptEvent) -> Result<(), LoggerError> {
        let body = match &event.kind {
            EventKind::ToolInvocation { tool, input } => format!("[工具调用] {} {}", tool, input),
            EventKind::ToolResult {
                tool,
                output,
                is_error,
            } => {
                let tag = if *is_error { "工具错误" } else { "工具结果" };
                format!("[{}] {}\n{}", tag, tool, output)
            }
            EventKind::ToolRejected {
                name,
                input,
                reason,
            } => format!("[工具拒绝] {} {}\n{}", name, input, reason),
            EventKind::ModelText { text } => format!("[模型回复]\n{}", text),
        };

        let line = format!(
            "\n--- 第 {} 轮 {} ---\n{}\n",
            event.turn,
            chrono::Local::now().format("%H:%M:%S"),
            body
        );
        self.append(&self.path_for(identifier), &line)
    }
}

/// 同时写入多个日志
///
/// 单个日志出错不会阻止其他日志写入，返回第一个错误。
#[derive(Default)]
pub struct FanoutLogger {
    loggers: Vec<Arc<dyn TranscriptLogger>>,
}

impl FanoutLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, logger: Arc<dyn TranscriptLogger>) -> Self {
        self.loggers.push(logger);
        self
    }
}

impl TranscriptLogger for FanoutLogger {
    fn log_event(&self, identifier: &str, event: &TranscriptEvent) -> Result<(), LoggerError> {
        let mut first_error = None;
        for logger in &self.loggers {
            if let Err(e) = logger.log_event(identifier, event) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// 公司名转文件名：空格变下划线，去掉路径分隔符等字符
fn file_stem(identifier: &str) -> String {
    identifier
        .trim()
        .chars()
        .map(|c| match c {
            ' ' => '_',
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ToolKind;

    #[test]
    fn test_file_stem_replaces_spaces_and_separators() {
        assert_eq!(file_stem("Read AI"), "Read_AI");
        assert_eq!(file_stem("A/B Labs"), "A-B_Labs");
    }

    #[test]
    fn test_file_logger_appends_events() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileTranscriptLogger::new(dir.path().join("logs")).unwrap();

        let events = [
            TranscriptEvent::new(
                1,
                EventKind::ToolInvocation {
                    tool: ToolKind::WebSearch,
                    input: serde_json::json!({"query": "Read AI founders"}),
                },
            ),
            TranscriptEvent::new(1, EventKind::model_text(r#"<final>["David Shim"]</final>"#)),
        ];
        for event in &events {
            logger.log_event("Read AI", event).unwrap();
        }

        let content = fs::read_to_string(logger.path_for("Read AI")).unwrap();
        assert!(content.contains("会话日志"));
        assert!(content.contains("Read AI founders"));
        assert!(content.contains("David Shim"));
        assert_eq!(content.matches("会话日志").count(), 1);
    }

    #[test]
    fn test_file_logger_records_rejected_tool() {
        let dir = tempfile::tempdir().unwrap();
        let logger = FileTranscriptLogger::new(dir.path()).unwrap();

        let event = TranscriptEvent::new(
            2,
            EventKind::ToolRejected {
                name: "shell".to_string(),
                input: serde_json::json!({"cmd": "ls"}),
                reason: "未知工具: shell".to_string(),
            },
        );
        logger.log_event("Acme", &event).unwrap();

        let content = fs::read_to_string(logger.path_for("Acme")).unwrap();
        assert!(content.contains("[工具拒绝] shell"));
        assert!(content.contains("未知工具: shell"));
    }

    #[test]
    fn test_concurrent_writers_share_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Arc::new(FileTranscriptLogger::new(dir.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let logger = logger.clone();
                std::thread::spawn(move || {
                    for turn in 1..=5 {
                        let event =
                            TranscriptEvent::new(turn, EventKind::model_text(format!("writer {} line {}", i, turn)));
                        logger.log_event("Same Co", &event).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(logger.path_for("Same Co")).unwrap();
        assert_eq!(content.matches("会话日志").count(), 1);
        assert_eq!(content.matches("[模型回复]").count(), 40);
        for i in 0..8 {
            assert!(content.contains(&format!("[模型回复]\nwriter {} line 5\n", i)));
        }
    }

    struct Broken;

    impl TranscriptLogger for Broken {
        fn log_event(&self, _: &str, _: &TranscriptEvent) -> Result<(), LoggerError> {
            Err(LoggerError::WriteFailed {
                path: "nowhere".to_string(),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    #[test]
    fn test_fanout_keeps_writing_after_error() {
        let dir = tempfile::tempdir().unwrap();
        let file_logger = Arc::new(FileTranscriptLogger::new(dir.path()).unwrap());
        let fanout = FanoutLogger::new()
            .with(Arc::new(Broken))
            .with(file_logger.clone());

        let event = TranscriptEvent::new(1, EventKind::model_text("hello"));
        assert!(fanout.log_event("Acme", &event).is_err());
        assert!(file_logger.path_for("Acme").exists());
    }
}
