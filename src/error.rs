//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Endpoint Vitals 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum VitalsError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 端点拉取相关错误
    #[error("拉取错误: {0}")]
    Fetch(#[from] FetchError),

    /// 通知相关错误
    #[error("通知错误: {0}")]
    Notification(#[from] NotificationError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 配置文件已存在（生成默认配置时）
    #[error("配置文件已存在: {path}")]
    FileExists { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },

    /// 未注册的通知服务
    #[error("未知的通知服务: {name}，可用: {available:?}")]
    UnknownNotifier { name: String, available: Vec<String> },

    /// 未注册的监控类型
    #[error("未知的监控类型: {name}，可用: {available:?}")]
    UnknownMonitor { name: String, available: Vec<String> },
}

/// 单个端点的传输错误
///
/// 记录在 `PollResult` 中，不会越过拉取任务的边界传播。
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    /// 请求超时
    #[error("Request timeout after {}ms", .0.as_millis())]
    Timeout(#[serde(with = "crate::health::result::duration_serde")] Duration),

    /// 连接失败
    #[error("Connection failed: {0}")]
    Connect(String),

    /// 请求构建或发送失败
    #[error("Request failed: {0}")]
    Request(String),

    /// 响应体读取失败
    #[error("Could not read the response body: {0}")]
    Body(String),

    /// 拉取任务异常退出
    #[error("Fetch task aborted: {0}")]
    TaskAborted(String),
}

impl FetchError {
    /// 将 reqwest 错误归类为更清晰的传输错误
    pub fn from_reqwest(error: &reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            FetchError::Timeout(timeout)
        } else if error.is_connect() {
            FetchError::Connect(describe_reqwest(error))
        } else if error.is_body() || error.is_decode() {
            FetchError::Body(error.to_string())
        } else {
            FetchError::Request(describe_reqwest(error))
        }
    }
}

fn describe_reqwest(error: &reqwest::Error) -> String {
    let error_str = error.to_string();
    if error_str.contains("dns") || error_str.contains("DNS") {
        "DNS resolution failed".to_string()
    } else if error_str.contains("certificate")
        || error_str.contains("tls")
        || error_str.contains("ssl")
    {
        "SSL/TLS certificate error".to_string()
    } else if error.is_connect() {
        format!("Connection refused ({error_str})")
    } else {
        error_str
    }
}

/// 通知错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    /// 发送失败
    #[error("通知发送失败: {0}")]
    SendError(String),

    /// 模板渲染错误
    #[error("模板渲染失败: {0}")]
    TemplateError(String),

    /// 邮件构建错误（地址、头部等）
    #[error("邮件构建失败: {0}")]
    MessageError(String),

    /// 通道尚未实现真实发送
    #[error("{0} 通知通道尚未实现发送")]
    Unimplemented(&'static str),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, VitalsError>;
