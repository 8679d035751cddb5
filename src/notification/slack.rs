//! Slack通知后端
//!
//! 只校验webhook配置，尚未实现真实的webhook调用

use crate::config::SlackSettings;
use crate::error::{ConfigError, NotificationError};
use crate::health::CycleSnapshot;
use crate::notification::sender::NotifierBackend;
use async_trait::async_trait;
use tracing::{info, warn};

/// Slack通知后端
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    webhook: String,
}

impl SlackNotifier {
    /// 根据配置创建Slack通知后端，webhook不能为空
    pub fn configure(settings: &SlackSettings) -> Result<Self, ConfigError> {
        let webhook = settings.webhook.trim();
        if webhook.is_empty() {
            return Err(ConfigError::ValidationError(
                "webhook for Slack not defined".to_string(),
            ));
        }

        Ok(Self {
            webhook: webhook.to_string(),
        })
    }

    /// 配置的webhook URL
    pub fn webhook(&self) -> &str {
        &self.webhook
    }
}

#[async_trait]
impl NotifierBackend for SlackNotifier {
    fn type_name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, snapshot: &CycleSnapshot) -> Result<(), NotificationError> {
        warn!(
            webhook = %self.webhook,
            unhealthy = snapshot.unhealthy_count(),
            "Slack webhook delivery is not implemented"
        );
        Err(NotificationError::Unimplemented("slack"))
    }

    async fn send_mockup(&self) -> Result<(), NotificationError> {
        info!(webhook = %self.webhook, "Sending...");
        Ok(())
    }
}
