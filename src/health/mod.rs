//! 健康检测模块
//!
//! 提供端点并发拉取、健康判定和周期快照

pub mod evaluator;
pub mod fetcher;
pub mod poller;
pub mod result;

// 重新导出主要类型
pub use evaluator::{evaluate, is_healthy};
pub use fetcher::{BodyFetcher, FetchedBody, HttpFetcher};
pub use poller::Poller;
pub use result::{CycleSnapshot, Endpoint, HealthStatus, PollResult, UnhealthyReason};
