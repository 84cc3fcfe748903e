//! 会话编排器 - 编排层
//!
//! ## 职责
//!
//! 为每个公司启动一个独立的 `ConversationDriver`，全部同时派发，等待全部结束。
//!
//! ## 核心功能
//!
//! 1. **同时派发**：所有任务在同一时刻 `tokio::spawn`，彼此没有共享的可变状态
//! 2. **可选限流**：配置了上限时，任务在内部等待 `Semaphore` 许可
//! 3. **等待全部**：`join_all` 等所有会话终止，慢的会话不会导致其他结果丢失
//! 4. **顺序保持**：返回顺序与输入顺序一致，与完成顺序无关
//! 5. **故障隔离**：任务 panic 只会让对应公司变成 `Failed`

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::models::{Record, Session};
use crate::workflow::{ConversationDriver, SessionCtx};

/// 会话编排器
pub struct SessionOrchestrator {
    driver: ConversationDriver,
    max_concurrent: Option<usize>,
}

impl SessionOrchestrator {
    /// `max_concurrent` 为 `None` 时不限并发
    pub fn new(driver: ConversationDriver, max_concurrent: Option<usize>) -> Self {
        Self {
            driver,
            max_concurrent,
        }
    }

    pub fn max_concurrent(&self) -> Option<usize> {
        self.max_concurrent
    }

    /// 运行所有公司的会话，按输入顺序返回
    pub async fn run_all(&self, records: Vec<Record>) -> Vec<Session> {
        let total = records.len();
        let semaphore = self
            .max_concurrent
            .map(|limit| Arc::new(Semaphore::new(limit.max(1))));

        let mut pending = Vec::with_capacity(total);
        let mut handles = Vec::with_capacity(total);

        for (idx, record) in records.into_iter().enumerate() {
            let ctx = SessionCtx::new(record.identifier.clone(), idx + 1, total);
            let driver = self.driver.clone();
            let semaphore = semaphore.clone();
            pending.push(record.clone());

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                let session = driver.run(record, &ctx).await;
                info!(
                    "{} 会话结束: {} (用了 {} 轮, 调用工具 {} 次)",
                    ctx,
                    session.status.label(),
                    session.turns_used,
                    session.tool_invocations()
                );
                session
            }));
        }

        let results = join_all(handles).await;

        pending
            .into_iter()
            .zip(results)
            .enumerate()
            .map(|(idx, (record, result))| match result {
                Ok(session) => session,
                Err(e) => {
                    error!("[{}/{} {}] 任务执行失败: {}", idx + 1, total, record.identifier, e);
                    Session::failed(record, format!("任务执行失败: {}", e))
                }
            })
            .collect()
    }
}
