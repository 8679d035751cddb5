//! 监控器模块
//!
//! 一个监控器负责一组端点的一次完整周期：拉取、评估、告警日志、通知分发

pub mod http;

use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::health::{CycleSnapshot, Endpoint};
use crate::notification::{DispatchOutcome, NotifierBackend};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

pub use http::HttpMonitor;

/// 一个周期的执行结果
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// 本周期的拉取结果和健康状态
    pub snapshot: CycleSnapshot,
    /// 通知分发结果
    pub outcome: DispatchOutcome,
}

/// 监控器trait
#[async_trait]
pub trait Monitor: Send + Sync {
    /// 监控器类型名
    fn kind(&self) -> &'static str;

    /// 被监控端点，按声明顺序
    fn endpoints(&self) -> &[Endpoint];

    /// 执行一个完整周期
    ///
    /// # 参数
    /// * `notifier` - 通知后端
    /// * `mock` - 为 true 时只调用 `send_mockup`
    async fn run_cycle(&self, notifier: &dyn NotifierBackend, mock: bool) -> CycleReport;
}

/// 监控器构造函数
pub type MonitorFactory = fn(&Config) -> Result<Arc<dyn Monitor>>;

fn http_factory(config: &Config) -> Result<Arc<dyn Monitor>> {
    Ok(Arc::new(HttpMonitor::from_config(config)?))
}

/// 监控类型名到构造函数的注册表
#[derive(Clone, Default)]
pub struct MonitorRegistry {
    factories: BTreeMap<String, MonitorFactory>,
}

impl std::fmt::Debug for MonitorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册内置的 http 监控器
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("http", http_factory);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, factory: MonitorFactory) {
        self.factories
            .insert(name.into().trim().to_lowercase(), factory);
    }

    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// 按配置中的 `monitor_type` 构造监控器，未知类型返回 [`ConfigError::UnknownMonitor`]
    pub fn build(&self, config: &Config) -> Result<Arc<dyn Monitor>> {
        let name = config.monitor_type.trim().to_lowercase();
        let factory = self
            .factories
            .get(&name)
            .ok_or_else(|| ConfigError::UnknownMonitor {
                name: config.monitor_type.clone(),
                available: self.names(),
            })?;

        factory(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VitalsError;

    #[test]
    fn test_builtin_http_monitor() {
        let registry = MonitorRegistry::with_builtin();
        let monitor = registry.build(&Config::sample()).unwrap();

        assert_eq!(monitor.kind(), "http");
        assert_eq!(monitor.endpoints().len(), 1);
        assert_eq!(monitor.endpoints()[0].expected_substring, "OK");
    }

    #[test]
    fn test_unknown_monitor_type() {
        let mut config = Config::sample();
        config.monitor_type = "ftp".to_string();

        let err = MonitorRegistry::with_builtin().build(&config).err().unwrap();
        match err {
            VitalsError::Config(ConfigError::UnknownMonitor { name, available }) => {
                assert_eq!(name, "ftp");
                assert_eq!(available, vec!["http".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
