//! 通知分发
//!
//! 按端点声明顺序查找第一个不健康的端点，每个周期最多发送一次通知

use crate::health::CycleSnapshot;
use crate::notification::sender::NotifierBackend;
use serde::Serialize;
use tracing::{error, info};

/// 一次分发的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// 全部健康，未发送通知
    AllHealthy,
    /// 已发送通知
    Sent { url: String },
    /// 已发送模拟通知
    Mocked { url: String },
    /// 发送失败（已记录日志，不中断流程）
    Failed { url: String, error: String },
}

impl DispatchOutcome {
    /// 是否调用了通知后端
    pub fn notified(&self) -> bool {
        !matches!(self, DispatchOutcome::AllHealthy)
    }
}

/// 分发本周期的通知
///
/// 第一个不健康的端点触发一次 `send`（`mock` 时为 `send_mockup`），之后的
/// 不健康端点不再触发。发送失败只记录日志。
pub async fn dispatch(
    snapshot: &CycleSnapshot,
    notifier: &dyn NotifierBackend,
    mock: bool,
) -> DispatchOutcome {
    let Some(first) = snapshot.first_unhealthy() else {
        info!("all endpoints healthy, no notification sent");
        return DispatchOutcome::AllHealthy;
    };
    let url = first.url.clone();

    if mock {
        info!(url = %url, notifier = notifier.type_name(), "Sending mock notifications...");
        return match notifier.send_mockup().await {
            Ok(()) => DispatchOutcome::Mocked { url },
            Err(e) => {
                error!(url = %url, error = %e, "Could not send mock notifications");
                DispatchOutcome::Failed {
                    url,
                    error: e.to_string(),
                }
            }
        };
    }

    info!(url = %url, notifier = notifier.type_name(), "Sending notifications...");
    match notifier.send(snapshot).await {
        Ok(()) => DispatchOutcome::Sent { url },
        Err(e) => {
            error!(url = %url, error = %e, "Could not send notifications");
            DispatchOutcome::Failed {
                url,
                error: e.to_string(),
            }
        }
    }
}
