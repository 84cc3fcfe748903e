//! 批量调研处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次批量调研的完整生命周期。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置，创建 agent 服务、会话日志和会话驱动
//! 2. **批量加载**：读取所有待调研的公司（`Vec<Record>`）
//! 3. **并发调研**：委托 `SessionOrchestrator` 同时运行所有会话
//! 4. **结果汇总**：委托 `aggregate` 生成报告
//! 5. **结果输出**：写入 JSON 并输出全局统计
//!
//! 单个公司失败不会让整批失败，只有输入文件无法读取或结果无法写入才会返回错误。

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use crate::config::Config;
use crate::models::{load_records, AggregateReport, StatusCounts};
use crate::orchestrator::aggregator::aggregate;
use crate::orchestrator::session_orchestrator::SessionOrchestrator;
use crate::services::{
    AgentService, FanoutLogger, FileTranscriptLogger, OpenAiAgentService, ReportWriter,
    TracingTranscriptLogger, TranscriptLogger,
};
use crate::utils::logging;
use crate::workflow::{ConversationDriver, DriverSettings};

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: SessionOrchestrator,
    writer: ReportWriter,
}

impl App {
    /// 初始化应用（使用 OpenAI 兼容服务）
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置校验失败")?;
        let agent: Arc<dyn AgentService> = Arc::new(OpenAiAgentService::new(&config));
        Self::with_agent(config, agent)
    }

    /// 使用指定的 agent 服务初始化
    pub fn with_agent(config: Config, agent: Arc<dyn AgentService>) -> Result<Self> {
        logging::log_startup(&config);

        let logger = build_logger(&config)?;
        let driver = ConversationDriver::new(agent, logger, DriverSettings::from_config(&config));
        let orchestrator = SessionOrchestrator::new(driver, config.max_concurrent_sessions);
        let writer = ReportWriter::with_path(&config.output_file);

        Ok(Self {
            config,
            orchestrator,
            writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<AggregateReport> {
        let records = load_records(&self.config.input_file).await?;

        if records.is_empty() {
            warn!("⚠️ 输入文件中没有公司，程序结束");
            return Ok(AggregateReport {
                entries: Vec::new(),
                succeeded: 0,
                failed: 0,
                by_status: StatusCounts::default(),
            });
        }

        logging::log_records_loaded(records.len(), self.orchestrator.max_concurrent());

        let sessions = self.orchestrator.run_all(records).await;
        let report = aggregate(sessions);

        self.writer.write(&report).await?;
        logging::print_final_stats(&report, &self.writer.path().display().to_string());

        Ok(report)
    }
}

/// tracing 实时进度 + 可选的逐公司日志文件
fn build_logger(config: &Config) -> Result<Arc<dyn TranscriptLogger>> {
    let mut fanout =
        FanoutLogger::new().with(Arc::new(TracingTranscriptLogger::new(config.verbose_logging)));

    if let Some(dir) = &config.transcript_dir {
        let file_logger = FileTranscriptLogger::new(dir)
            .with_context(|| format!("无法创建会话日志目录: {}", dir))?;
        fanout = fanout.with(Arc::new(file_logger));
    }

    Ok(Arc::new(fanout))
}
