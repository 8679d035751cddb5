//! 并发拉取器模块
//!
//! 每个端点一个拉取任务，通过信号量限制并发，等待全部任务结束后
//! 按端点声明顺序返回结果

use crate::error::FetchError;
use crate::health::fetcher::BodyFetcher;
use crate::health::result::{Endpoint, PollResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// 默认最大并发拉取数
pub const DEFAULT_MAX_CONCURRENT: usize = 50;

/// 配置允许的最大并发拉取数
pub const MAX_CONCURRENT_LIMIT: usize = 10_000;

/// 端点拉取器
pub struct Poller {
    /// 响应拉取器
    fetcher: Arc<dyn BodyFetcher>,
    /// 单个请求的超时时间
    timeout: Duration,
    /// 并发控制信号量
    semaphore: Arc<Semaphore>,
}

impl Poller {
    /// 创建新的拉取器
    ///
    /// # 参数
    /// * `fetcher` - 响应拉取器
    /// * `timeout` - 单个请求的超时时间
    /// * `max_concurrent` - 最大并发拉取数（0 视为 1，超过信号量上限时取上限）
    pub fn new(fetcher: Arc<dyn BodyFetcher>, timeout: Duration, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            timeout,
            semaphore: Arc::new(Semaphore::new(
                max_concurrent.clamp(1, Semaphore::MAX_PERMITS),
            )),
        }
    }

    /// 单个请求的超时时间
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// 并发拉取全部端点
    ///
    /// 每个端点恰好对应一个结果，顺序与 `endpoints` 一致，与任务完成顺序无关。
    /// 单个端点的失败只记录在它自己的结果中。
    pub async fn poll(&self, endpoints: &[Endpoint]) -> Vec<PollResult> {
        let mut tasks = JoinSet::new();

        for (index, endpoint) in endpoints.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&self.semaphore);
            let url = endpoint.url.clone();
            let timeout = self.timeout;

            tasks.spawn(async move {
                // 信号量只在 Poller 内部持有，不会被关闭
                let _permit = semaphore.acquire_owned().await.ok();
                (index, fetch_one(fetcher.as_ref(), url, timeout).await)
            });
        }

        // 任务本地结果在汇合点按下标归位，无需共享锁
        let mut slots: Vec<Option<PollResult>> = vec![None; endpoints.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!("拉取任务异常退出: {}", e),
            }
        }

        slots
            .into_iter()
            .zip(endpoints)
            .map(|(slot, endpoint)| {
                slot.unwrap_or_else(|| {
                    PollResult::failure(
                        endpoint.url.clone(),
                        FetchError::TaskAborted("task panicked or was cancelled".to_string()),
                    )
                })
            })
            .collect()
    }
}

async fn fetch_one(fetcher: &dyn BodyFetcher, url: String, timeout: Duration) -> PollResult {
    let started = Instant::now();
    let outcome = match tokio::time::timeout(timeout, fetcher.fetch(&url)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(FetchError::Timeout(timeout)),
    };
    let elapsed = started.elapsed();

    match outcome {
        Ok(fetched) => {
            info!(url = %url, status = fetched.status_code, "successfully queried defined url");
            PollResult::success(url, fetched.body)
                .with_status_code(fetched.status_code)
                .with_response_time(elapsed)
        }
        Err(e) => {
            debug!(url = %url, error = %e, "could not query url");
            PollResult::failure(url, e).with_response_time(elapsed)
        }
    }
}
