//! 健康检测数据结构
//!
//! 定义端点、单次拉取结果、健康判定以及一个周期的完整快照

use crate::error::FetchError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// 被监控的HTTP端点
///
/// 配置加载后不可变，生命周期覆盖一次进程运行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    /// 端点URL
    pub url: String,
    /// 健康响应中应包含的子串
    pub expected_substring: String,
}

impl Endpoint {
    /// 创建新的端点
    pub fn new(url: impl Into<String>, expected_substring: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            expected_substring: expected_substring.into(),
        }
    }
}

/// 单个端点在一个周期内的拉取结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResult {
    /// 端点URL
    pub url: String,
    /// 响应体（传输失败时为空）
    pub body: String,
    /// 传输错误（如果有）
    pub error: Option<FetchError>,
    /// HTTP状态码（如果收到响应）
    pub status_code: Option<u16>,
    /// 响应时间
    #[serde(with = "duration_serde")]
    pub response_time: Duration,
    /// 拉取完成时间
    pub fetched_at: DateTime<Utc>,
}

impl PollResult {
    /// 创建成功的拉取结果
    pub fn success(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
            error: None,
            status_code: None,
            response_time: Duration::from_millis(0),
            fetched_at: Utc::now(),
        }
    }

    /// 创建携带传输错误的拉取结果
    pub fn failure(url: impl Into<String>, error: FetchError) -> Self {
        Self {
            url: url.into(),
            body: String::new(),
            error: Some(error),
            status_code: None,
            response_time: Duration::from_millis(0),
            fetched_at: Utc::now(),
        }
    }

    /// 设置HTTP状态码
    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    /// 设置响应时间
    pub fn with_response_time(mut self, response_time: Duration) -> Self {
        self.response_time = response_time;
        self
    }

    /// 获取响应时间（毫秒）
    pub fn response_time_ms(&self) -> u64 {
        self.response_time.as_millis() as u64
    }

    /// 是否发生了传输错误
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// 不健康的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnhealthyReason {
    /// 传输失败
    TransportError,
    /// 响应中未找到期望的子串
    ExpectedResponseMissing,
    /// 本周期没有该端点的拉取结果
    NoResult,
}

/// 单个端点的健康判定，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// 端点URL
    pub url: String,
    /// 是否健康
    pub healthy: bool,
    /// 不健康的原因
    pub reason: Option<UnhealthyReason>,
}

impl HealthStatus {
    /// 健康的判定
    pub fn healthy(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            healthy: true,
            reason: None,
        }
    }

    /// 不健康的判定
    pub fn unhealthy(url: impl Into<String>, reason: UnhealthyReason) -> Self {
        Self {
            url: url.into(),
            healthy: false,
            reason: Some(reason),
        }
    }

    /// 日志与报告中使用的状态标签
    pub fn label(&self) -> &'static str {
        if self.healthy {
            "HEALTHY"
        } else {
            "NOT-HEALTHY"
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.url, self.label())
    }
}

/// 一个周期的完整快照，按引用交给通知器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleSnapshot {
    /// 周期ID
    pub id: Uuid,
    /// 周期开始时间
    pub started_at: DateTime<Utc>,
    /// 按端点声明顺序排列的拉取结果
    pub results: Vec<PollResult>,
    /// 按端点声明顺序排列的健康判定
    pub statuses: Vec<HealthStatus>,
}

impl CycleSnapshot {
    /// 创建新的快照
    pub fn new(
        started_at: DateTime<Utc>,
        results: Vec<PollResult>,
        statuses: Vec<HealthStatus>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            results,
            statuses,
        }
    }

    /// 按顺序第一个不健康的端点
    pub fn first_unhealthy(&self) -> Option<&HealthStatus> {
        self.statuses.iter().find(|status| !status.healthy)
    }

    /// 不健康端点数量
    pub fn unhealthy_count(&self) -> usize {
        self.statuses.iter().filter(|status| !status.healthy).count()
    }

    /// 是否全部健康
    pub fn all_healthy(&self) -> bool {
        self.statuses.iter().all(|status| status.healthy)
    }

    /// 将拉取结果与健康判定按URL配对
    pub fn entries(&self) -> impl Iterator<Item = (&HealthStatus, Option<&PollResult>)> {
        self.statuses.iter().enumerate().map(move |(index, status)| {
            let result = self
                .results
                .get(index)
                .filter(|result| result.url == status.url)
                .or_else(|| self.results.iter().find(|result| result.url == status.url));
            (status, result)
        })
    }

    /// 转换为JSON字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Duration序列化模块
pub(crate) mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
