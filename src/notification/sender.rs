//! 通知后端模块
//!
//! 定义通知后端的能力集合：真实发送、模拟发送

use crate::error::NotificationError;
use crate::health::CycleSnapshot;
use async_trait::async_trait;

/// 通知后端trait
///
/// 配置阶段由 [`crate::notification::NotifierRegistry`] 按名称构造，
/// 每个周期最多被调用一次。
#[async_trait]
pub trait NotifierBackend: Send + Sync + std::fmt::Debug {
    /// 通知后端名称（如 "email"）
    fn type_name(&self) -> &'static str;

    /// 发送包含整个周期详情的通知
    ///
    /// # 参数
    /// * `snapshot` - 本周期的快照
    ///
    /// # 返回
    /// * `Result<(), NotificationError>` - 发送结果
    async fn send(&self, snapshot: &CycleSnapshot) -> Result<(), NotificationError>;

    /// 模拟发送，不产生任何外部调用
    async fn send_mockup(&self) -> Result<(), NotificationError>;
}
