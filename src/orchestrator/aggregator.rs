//! 结果汇总器 - 编排层
//!
//! 按输入顺序对每个会话运行提取引擎，生成唯一的输出产物 `AggregateReport`。
//!
//! 统计口径：名单非空计为成功，名单为空计为失败。轮数用尽本身不算失败，
//! 终止状态另外在 `by_status` 中单独计数。

use tracing::info;

use crate::extraction::extract;
use crate::models::{AggregateReport, ReportEntry, Session, StatusCounts};

/// 汇总所有已终止的会话
///
/// `sessions` 必须按输入顺序排列（`SessionOrchestrator::run_all` 保证这一点）。
pub fn aggregate(sessions: Vec<Session>) -> AggregateReport {
    let total = sessions.len();
    let mut by_status = StatusCounts::default();
    let mut succeeded = 0;
    let mut failed = 0;

    let entries: Vec<ReportEntry> = sessions
        .into_iter()
        .enumerate()
        .map(|(idx, session)| {
            let result = extract(&session.events);
            by_status.record(session.status);
            if result.has_names() {
                succeeded += 1;
            } else {
                failed += 1;
            }

            info!(
                "[{}/{}] ✓ {}: 找到 {} 位创始人 ({:?}, {})",
                idx + 1,
                total,
                session.record.identifier,
                result.names.len(),
                result.tier,
                session.status.label()
            );

            ReportEntry {
                record: session.record,
                status: session.status,
                turns_used: session.turns_used,
                result,
            }
        })
        .collect();

    AggregateReport {
        entries,
        succeeded,
        failed,
        by_status,
    }
}
