//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use crate::health::poller::MAX_CONCURRENT_LIMIT;
use crate::health::Endpoint;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 主配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// 通知服务名称（email, slack）
    #[serde(default = "default_notify_service")]
    pub notify_service: String,
    /// 监控类型
    #[serde(default = "default_monitor_type")]
    pub monitor_type: String,
    /// 检测间隔（秒），由外部调度器使用
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// 最大并发检测数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_checks: usize,
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 日志文件路径
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// 被监控的服务
    #[serde(default)]
    pub monitored_services: MonitoredServices,
    /// 通知通道配置
    #[serde(default)]
    pub notification_services: NotificationServices,
}

/// 被监控服务列表
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonitoredServices {
    /// HTTP端点
    #[serde(default)]
    pub http: Vec<HttpMonitorConfig>,
}

/// 单个HTTP端点配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpMonitorConfig {
    /// 端点URL
    pub endpoint: String,
    /// 响应中应包含的字符串
    #[serde(default)]
    pub expected_response: String,
}

/// 通知通道配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationServices {
    /// 邮件通知
    #[serde(default)]
    pub email: EmailSettings,
    /// Slack通知
    #[serde(default)]
    pub slack: SlackSettings,
}

/// 邮件通知配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailSettings {
    /// 收件人
    #[serde(default)]
    pub to: Vec<String>,
    /// 抄送
    #[serde(default)]
    pub cc: Vec<String>,
    /// 密送
    #[serde(default)]
    pub bcc: Vec<String>,
    /// 发件人
    #[serde(default = "default_email_from")]
    pub from: String,
    /// 邮件主题
    #[serde(default = "default_email_subject")]
    pub subject: String,
    /// 自定义邮件正文，未设置时使用默认报告模板
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// SMTP服务器
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,
    /// SMTP端口
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// 是否启用SMTP认证
    #[serde(default)]
    pub use_auth: bool,
    /// SMTP认证用户，未设置时使用发件人地址
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_user: Option<String>,
    /// SMTP认证密码
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_pass: Option<String>,
}

/// Slack通知配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlackSettings {
    /// Webhook URL
    #[serde(default)]
    pub webhook: String,
}

// 默认值函数
fn default_notify_service() -> String {
    "email".to_string()
}
fn default_monitor_type() -> String {
    "http".to_string()
}
fn default_interval() -> u64 {
    300
}
fn default_timeout() -> u64 {
    60
}
fn default_max_concurrent() -> usize {
    crate::health::poller::DEFAULT_MAX_CONCURRENT
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_email_from() -> String {
    "vitals@service.check".to_string()
}
fn default_email_subject() -> String {
    "[ENDPOINT-VITALS] SERVICE ENTERED AN ALARM STATE".to_string()
}
fn default_smtp_server() -> String {
    "localhost".to_string()
}
fn default_smtp_port() -> u16 {
    25
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notify_service: default_notify_service(),
            monitor_type: default_monitor_type(),
            interval_seconds: default_interval(),
            timeout_seconds: default_timeout(),
            max_concurrent_checks: default_max_concurrent(),
            log_level: default_log_level(),
            log_file: None,
            monitored_services: MonitoredServices::default(),
            notification_services: NotificationServices::default(),
        }
    }
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            from: default_email_from(),
            subject: default_email_subject(),
            body: None,
            smtp_server: default_smtp_server(),
            smtp_port: default_smtp_port(),
            use_auth: false,
            auth_user: None,
            auth_pass: None,
        }
    }
}

impl Config {
    /// 生成默认配置文件时使用的示例配置
    pub fn sample() -> Self {
        let mut config = Self::default();
        config.monitored_services.http.push(HttpMonitorConfig {
            endpoint: "https://example.com/health".to_string(),
            expected_response: "OK".to_string(),
        });
        config
            .notification_services
            .email
            .to
            .push("ops@example.com".to_string());
        config
    }

    /// 按声明顺序返回被监控端点
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.monitored_services
            .http
            .iter()
            .map(|http| Endpoint::new(http.endpoint.clone(), http.expected_response.clone()))
            .collect()
    }

    /// 单个请求的超时时间
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// 序列化为TOML字符串
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    if config.monitored_services.http.is_empty() {
        return Err("至少需要配置一个监控端点 (endpoint is mandatory)".to_string());
    }

    for (index, http) in config.monitored_services.http.iter().enumerate() {
        if http.endpoint.trim().is_empty() {
            return Err(format!("第 {} 个端点的 endpoint 不能为空", index + 1));
        }

        if !http.endpoint.starts_with("http://") && !http.endpoint.starts_with("https://") {
            return Err(format!("端点 {} 的URL格式无效", http.endpoint));
        }

        if http.expected_response.is_empty() {
            return Err(format!(
                "端点 {} 必须指定 expected_response (response is mandatory)",
                http.endpoint
            ));
        }
    }

    if config.notify_service.trim().is_empty() {
        return Err("必须指定通知服务 notify_service (notify is mandatory)".to_string());
    }

    if config.monitor_type.trim().is_empty() {
        return Err("必须指定监控类型 monitor_type".to_string());
    }

    if config.interval_seconds == 0 {
        return Err("检测间隔不能为0".to_string());
    }

    if config.timeout_seconds == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    if config.max_concurrent_checks == 0 {
        return Err("最大并发检测数不能为0".to_string());
    }

    if config.max_concurrent_checks > MAX_CONCURRENT_LIMIT {
        return Err(format!(
            "最大并发检测数不能超过 {}，当前: {}",
            MAX_CONCURRENT_LIMIT, config.max_concurrent_checks
        ));
    }

    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.log_level.to_lowercase().as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.log_level, valid_log_levels
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = Config::sample();

        let serialized = config.to_toml().expect("序列化失败");
        assert!(serialized.contains("notify_service"));
        assert!(serialized.contains("https://example.com/health"));

        let deserialized: Config = toml::from_str(&serialized).expect("反序列化失败");
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_default_values() {
        let config: Config = toml::from_str(
            r#"
[[monitored_services.http]]
endpoint = "https://example.com"
expected_response = "ok"
"#,
        )
        .unwrap();

        assert_eq!(config.notify_service, "email");
        assert_eq!(config.monitor_type, "http");
        assert_eq!(config.interval_seconds, 300);
        assert_eq!(config.timeout_seconds, 60);
        assert_eq!(config.max_concurrent_checks, 50);
        assert_eq!(config.log_level, "info");

        let email = &config.notification_services.email;
        assert_eq!(email.smtp_server, "localhost");
        assert_eq!(email.smtp_port, 25);
        assert!(!email.use_auth);
        assert_eq!(email.from, "vitals@service.check");
        assert!(email.body.is_none());
    }

    #[test]
    fn test_config_validation() {
        assert!(validate_config(&Config::sample()).is_ok());
    }

    #[test]
    fn test_config_validation_missing_endpoint() {
        let config = Config::default();
        let result = validate_config(&config);
        assert!(result.unwrap_err().contains("endpoint is mandatory"));
    }

    #[test]
    fn test_config_validation_invalid_url() {
        let mut config = Config::sample();
        config.monitored_services.http[0].endpoint = "example.com".to_string();
        assert!(validate_config(&config).unwrap_err().contains("URL格式无效"));
    }

    #[test]
    fn test_config_validation_missing_expected_response() {
        let mut config = Config::sample();
        config.monitored_services.http[0].expected_response.clear();
        assert!(validate_config(&config)
            .unwrap_err()
            .contains("response is mandatory"));
    }

    #[test]
    fn test_config_validation_missing_notify_service() {
        let mut config = Config::sample();
        config.notify_service = "  ".to_string();
        assert!(validate_config(&config)
            .unwrap_err()
            .contains("notify is mandatory"));
    }

    #[test]
    fn test_config_validation_zero_limits() {
        let mut config = Config::sample();
        config.timeout_seconds = 0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::sample();
        config.max_concurrent_checks = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_config_validation_concurrency_upper_bound() {
        let mut config = Config::sample();
        config.max_concurrent_checks = usize::MAX;
        assert!(validate_config(&config)
            .unwrap_err()
            .contains("最大并发检测数不能超过"));

        config.max_concurrent_checks = MAX_CONCURRENT_LIMIT;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = Config::sample();
        config.log_level = "verbose".to_string();
        assert!(validate_config(&config).unwrap_err().contains("日志级别"));
    }

    #[test]
    fn test_endpoints_preserve_declaration_order() {
        let mut config = Config::sample();
        config.monitored_services.http.push(HttpMonitorConfig {
            endpoint: "https://second.example.com".to_string(),
            expected_response: "pong".to_string(),
        });

        let endpoints = config.endpoints();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[0].url, "https://example.com/health");
        assert_eq!(endpoints[1], Endpoint::new("https://second.example.com", "pong"));
    }
}
