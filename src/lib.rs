//! Endpoint Vitals - HTTP端点健康检测工具
//!
//! 并发拉取一组HTTP端点，检查响应中是否包含期望的子串，
//! 每个周期最多通过一个可插拔的通知后端发送一次告警：
//! - 有界并发的HTTP拉取
//! - 纯函数健康判定
//! - 邮件通知（Slack 后端仅校验配置）
//! - 结构化日志记录

pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod monitor;
pub mod notification;

// 重新导出主要类型
pub use config::Config;
pub use error::VitalsError;
pub use health::{CycleSnapshot, Endpoint, HealthStatus, PollResult};
pub use monitor::{CycleReport, Monitor, MonitorRegistry};
pub use notification::{DispatchOutcome, NotifierBackend, NotifierRegistry};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
