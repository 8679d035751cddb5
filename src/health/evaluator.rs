//! 健康判定
//!
//! 纯函数：拉取结果 + 期望子串 → 健康判定。除日志外没有副作用。

use crate::health::result::{Endpoint, HealthStatus, PollResult, UnhealthyReason};
use tracing::{info, warn};

/// 判定单个拉取结果是否健康
///
/// 健康当且仅当没有传输错误且响应体包含期望子串（区分大小写）。
/// 空的期望子串总是被包含。
pub fn is_healthy(result: &PollResult, expected_substring: &str) -> bool {
    verdict(result, expected_substring).is_none()
}

fn verdict(result: &PollResult, expected_substring: &str) -> Option<UnhealthyReason> {
    if result.error.is_some() {
        Some(UnhealthyReason::TransportError)
    } else if !result.body.contains(expected_substring) {
        Some(UnhealthyReason::ExpectedResponseMissing)
    } else {
        None
    }
}

/// 对一个周期的全部结果做健康判定
///
/// 输出与 `endpoints` 一一对应且顺序一致。结果优先按下标匹配，
/// 下标处URL不一致时按URL查找；找不到结果的端点判定为不健康。
pub fn evaluate(results: &[PollResult], endpoints: &[Endpoint]) -> Vec<HealthStatus> {
    endpoints
        .iter()
        .enumerate()
        .map(|(index, endpoint)| {
            let result = results
                .get(index)
                .filter(|result| result.url == endpoint.url)
                .or_else(|| results.iter().find(|result| result.url == endpoint.url));

            let status = match result {
                Some(result) => match verdict(result, &endpoint.expected_substring) {
                    None => HealthStatus::healthy(endpoint.url.clone()),
                    Some(reason) => HealthStatus::unhealthy(endpoint.url.clone(), reason),
                },
                None => {
                    warn!(url = %endpoint.url, "no poll result for endpoint");
                    HealthStatus::unhealthy(endpoint.url.clone(), UnhealthyReason::NoResult)
                }
            };

            info!(url = %status.url, status = status.label(), "service health");
            status
        })
        .collect()
}
