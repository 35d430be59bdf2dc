// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::webhook::{DeliveryReceipt, WebhookDeliveryPayload};
use async_trait::async_trait;
use thiserror::Error;

/// 投递错误类型
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// 负载无法序列化
    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 重试耗尽，携带最后一次的HTTP状态和响应体摘录
    #[error("Webhook delivery failed after {attempts} attempts (last status: {last_status:?}): {last_body}")]
    Exhausted {
        attempts: u32,
        last_status: Option<u16>,
        last_body: String,
    },
}

/// Webhook投递特质
///
/// 定义发布投递的核心逻辑：签名、幂等、有界重试
#[async_trait]
pub trait WebhookDelivery: Send + Sync {
    /// 投递一次发布事件
    ///
    /// # 参数
    ///
    /// * `payload` - 投递负载
    ///
    /// # 返回值
    ///
    /// * `Ok(DeliveryReceipt)` - 接收方确认后的回执
    /// * `Err(DeliveryError)` - 重试耗尽后的投递失败
    async fn deliver_publish(
        &self,
        payload: &WebhookDeliveryPayload,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}
