//! HTTP监控器
//!
//! 并发拉取全部端点，按期望子串判定健康，记录告警日志后分发通知

use crate::config::Config;
use crate::error::Result;
use crate::health::{evaluate, CycleSnapshot, Endpoint, HttpFetcher, Poller};
use crate::monitor::{CycleReport, Monitor};
use crate::notification::{dispatch, NotifierBackend};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// HTTP端点监控器
pub struct HttpMonitor {
    poller: Poller,
    endpoints: Vec<Endpoint>,
}

impl std::fmt::Debug for HttpMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMonitor")
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.poller.timeout())
            .finish()
    }
}

impl HttpMonitor {
    /// 使用给定的拉取器创建监控器
    pub fn new(poller: Poller, endpoints: Vec<Endpoint>) -> Self {
        Self { poller, endpoints }
    }

    /// 根据配置创建监控器，使用真实的HTTP客户端
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(config.timeout())?);
        let poller = Poller::new(fetcher, config.timeout(), config.max_concurrent_checks);

        debug!(
            endpoints = config.monitored_services.http.len(),
            timeout_seconds = config.timeout_seconds,
            max_concurrent = config.max_concurrent_checks,
            "HTTP监控器创建完成"
        );

        Ok(Self::new(poller, config.endpoints()))
    }

    fn log_alarms(snapshot: &CycleSnapshot) {
        for status in &snapshot.statuses {
            if status.healthy {
                info!(url = %status.url, "service is healthy");
            } else {
                warn!(url = %status.url, reason = ?status.reason, "service entered ALARM state");
            }
        }
    }
}

#[async_trait]
impl Monitor for HttpMonitor {
    fn kind(&self) -> &'static str {
        "http"
    }

    fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    async fn run_cycle(&self, notifier: &dyn NotifierBackend, mock: bool) -> CycleReport {
        let started_at = Utc::now();
        info!(endpoints = self.endpoints.len(), mock, "开始检测周期");

        let results = self.poller.poll(&self.endpoints).await;
        let statuses = evaluate(&results, &self.endpoints);
        let snapshot = CycleSnapshot::new(started_at, results, statuses);

        Self::log_alarms(&snapshot);

        let outcome = dispatch(&snapshot, notifier, mock).await;

        info!(
            cycle_id = %snapshot.id,
            unhealthy = snapshot.unhealthy_count(),
            total = snapshot.statuses.len(),
            "检测周期完成"
        );

        CycleReport { snapshot, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use crate::health::UnhealthyReason;
    use crate::notification::DispatchOutcome;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl NotifierBackend for RecordingNotifier {
        fn type_name(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, snapshot: &CycleSnapshot) -> std::result::Result<(), NotificationError> {
            self.sent.lock().unwrap().push(snapshot.unhealthy_count());
            Ok(())
        }

        async fn send_mockup(&self) -> std::result::Result<(), NotificationError> {
            Ok(())
        }
    }

    fn monitor(endpoints: Vec<Endpoint>) -> HttpMonitor {
        let timeout = Duration::from_secs(5);
        let fetcher = Arc::new(HttpFetcher::new(timeout).unwrap());
        HttpMonitor::new(Poller::new(fetcher, timeout, 4), endpoints)
    }

    #[tokio::test]
    async fn test_cycle_against_live_server() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/ok")
            .with_status(200)
            .with_body("status: OK")
            .create_async()
            .await;
        let _degraded = server
            .mock("GET", "/degraded")
            .with_status(200)
            .with_body("status: DEGRADED")
            .create_async()
            .await;

        let monitor = monitor(vec![
            Endpoint::new(format!("{}/ok", server.url()), "OK"),
            Endpoint::new(format!("{}/degraded", server.url()), "OK"),
        ]);
        let notifier = RecordingNotifier::default();

        let report = monitor.run_cycle(&notifier, false).await;

        assert_eq!(report.snapshot.statuses.len(), 2);
        assert!(report.snapshot.statuses[0].healthy);
        assert_eq!(
            report.snapshot.statuses[1].reason,
            Some(UnhealthyReason::ExpectedResponseMissing)
        );
        assert_eq!(
            report.outcome,
            DispatchOutcome::Sent {
                url: format!("{}/degraded", server.url())
            }
        );
        assert_eq!(*notifier.sent.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_all_healthy_cycle_is_silent() {
        let mut server = mockito::Server::new_async().await;
        let _ok = server
            .mock("GET", "/health")
            .with_body("OK")
            .expect(1)
            .create_async()
            .await;

        let monitor = monitor(vec![Endpoint::new(format!("{}/health", server.url()), "OK")]);
        let notifier = RecordingNotifier::default();

        let report = monitor.run_cycle(&notifier, false).await;

        assert_eq!(report.outcome, DispatchOutcome::AllHealthy);
        assert!(notifier.sent.lock().unwrap().is_empty());
        _ok.assert_async().await;
    }

    #[tokio::test]
    async fn test_mock_cycle_does_not_send() {
        let monitor = monitor(vec![Endpoint::new("http://127.0.0.1:1/health", "OK")]);
        let notifier = RecordingNotifier::default();

        let report = monitor.run_cycle(&notifier, true).await;

        assert_eq!(
            report.outcome,
            DispatchOutcome::Mocked {
                url: "http://127.0.0.1:1/health".to_string()
            }
        );
        assert!(notifier.sent.lock().unwrap().is_empty());
    }
}
