// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::article::PortableArticle;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 默认的发布事件名
pub const DEFAULT_PUBLISH_EVENT: &str = "article.publish";

/// Webhook投递负载
///
/// 每次发布投递时构建的瞬态负载。`idempotency_key`缺省为
/// 由`article_id`派生的确定性值，使同一文章+事件的重复投递
/// 能被接收方识别为重复。
#[derive(Debug, Clone)]
pub struct WebhookDeliveryPayload {
    /// 投递目标URL
    pub target_url: String,
    /// 每集成的签名密钥
    pub secret: String,
    /// 文章内容
    pub article: PortableArticle,
    /// 文章ID
    pub article_id: Uuid,
    /// 项目（站点）ID
    pub project_id: Uuid,
    /// 集成ID
    pub integration_id: Uuid,
    /// 事件名，缺省为`article.publish`
    pub event: Option<String>,
    /// 幂等键，缺省为`article:{article_id}`
    pub idempotency_key: Option<String>,
}

impl WebhookDeliveryPayload {
    /// 实际使用的事件名
    pub fn event_name(&self) -> &str {
        self.event.as_deref().unwrap_or(DEFAULT_PUBLISH_EVENT)
    }

    /// 实际使用的幂等键
    pub fn idempotency_key(&self) -> String {
        self.idempotency_key
            .clone()
            .unwrap_or_else(|| format!("article:{}", self.article_id))
    }
}

/// 投递回执
///
/// 接收方对成功投递的结构化响应；2xx空响应体时所有字段为空。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// 接收方分配的外部ID
    pub external_id: Option<String>,
    /// 已发布内容的URL
    pub url: Option<String>,
    /// 原始响应体
    pub raw: Option<serde_json::Value>,
}
