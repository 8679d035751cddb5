//! 通知后端注册表
//!
//! 按配置中的名称选择并构造通知后端

use crate::config::NotificationServices;
use crate::error::ConfigError;
use crate::notification::email::EmailNotifier;
use crate::notification::sender::NotifierBackend;
use crate::notification::slack::SlackNotifier;
use std::collections::BTreeMap;
use std::sync::Arc;

/// 通知后端构造函数
pub type NotifierFactory =
    fn(&NotificationServices) -> Result<Arc<dyn NotifierBackend>, ConfigError>;

/// 名称到构造函数的注册表
#[derive(Clone, Default)]
pub struct NotifierRegistry {
    factories: BTreeMap<String, NotifierFactory>,
}

impl std::fmt::Debug for NotifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifierRegistry")
            .field("names", &self.names())
            .finish()
    }
}

fn email_factory(settings: &NotificationServices) -> Result<Arc<dyn NotifierBackend>, ConfigError> {
    Ok(Arc::new(EmailNotifier::configure(&settings.email)?))
}

fn slack_factory(settings: &NotificationServices) -> Result<Arc<dyn NotifierBackend>, ConfigError> {
    Ok(Arc::new(SlackNotifier::configure(&settings.slack)?))
}

impl NotifierRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册内置的 email 和 slack 后端
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("email", email_factory);
        registry.register("slack", slack_factory);
        registry
    }

    /// 注册通知后端，同名时覆盖
    pub fn register(&mut self, name: impl Into<String>, factory: NotifierFactory) {
        self.factories
            .insert(name.into().trim().to_lowercase(), factory);
    }

    /// 已注册的后端名称
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// 按名称构造通知后端
    ///
    /// 未知名称返回 [`ConfigError::UnknownNotifier`]，构造失败返回后端自身的配置错误。
    pub fn configure(
        &self,
        name: &str,
        settings: &NotificationServices,
    ) -> Result<Arc<dyn NotifierBackend>, ConfigError> {
        let factory = self
            .factories
            .get(&name.trim().to_lowercase())
            .ok_or_else(|| ConfigError::UnknownNotifier {
                name: name.to_string(),
                available: self.names(),
            })?;

        let notifier = factory(settings)?;
        tracing::debug!("通知后端 {} 配置完成", notifier.type_name());
        Ok(notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlackSettings;

    fn slack_settings() -> NotificationServices {
        NotificationServices {
            slack: SlackSettings {
                webhook: "https://hooks.slack.com/services/T/B/X".to_string(),
            },
            ..NotificationServices::default()
        }
    }

    #[test]
    fn test_builtin_names() {
        let registry = NotifierRegistry::with_builtin();
        assert_eq!(registry.names(), vec!["email".to_string(), "slack".to_string()]);
    }

    #[test]
    fn test_configure_by_name_is_case_insensitive() {
        let registry = NotifierRegistry::with_builtin();
        let notifier = registry.configure(" Slack ", &slack_settings()).unwrap();
        assert_eq!(notifier.type_name(), "slack");
    }

    #[test]
    fn test_unknown_notifier_is_config_error() {
        let registry = NotifierRegistry::with_builtin();
        let err = registry.configure("telegram", &slack_settings()).unwrap_err();

        match err {
            ConfigError::UnknownNotifier { name, available } => {
                assert_eq!(name, "telegram");
                assert!(available.contains(&"email".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_backend_validation_propagates() {
        let registry = NotifierRegistry::with_builtin();
        // 默认邮件配置没有收件人
        let err = registry
            .configure("email", &NotificationServices::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
