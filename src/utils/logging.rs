//! 日志工具模块
//!
//! 提供日志初始化、格式化和输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::AggregateReport;

/// 初始化 tracing 输出
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug / info。重复调用是安全的。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("founder_finder={},warn", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 并行调研模式");
    info!("🤖 模型: {}", config.llm_model_name);
    info!("🔁 每个会话最多 {} 轮", config.max_turns);
    match config.max_concurrent_sessions {
        Some(limit) => info!("📊 最大并发数: {}", limit),
        None => info!("📊 最大并发数: 不限"),
    }
    info!("{}", "=".repeat(60));
}

/// 记录公司加载信息
pub fn log_records_loaded(total: usize, max_concurrent: Option<usize>) {
    info!("✓ 找到 {} 个待调研的公司", total);
    match max_concurrent {
        Some(limit) => info!("📋 同时最多运行 {} 个会话\n", limit),
        None => info!("📋 所有公司同时开始\n"),
    }
}

/// 打印最终统计信息
pub fn print_final_stats(report: &AggregateReport, output_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("公司总数: {}", report.total());
    info!("✅ 找到创始人: {}", report.succeeded);
    info!("❌ 未找到创始人: {}", report.failed);
    info!(
        "会话状态: 最终答案 {} / 轮数用尽 {} / 失败 {}",
        report.by_status.final_answer, report.by_status.exhausted, report.by_status.failed
    );
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
