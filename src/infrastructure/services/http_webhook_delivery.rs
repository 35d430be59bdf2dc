// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::config::settings::WebhookSettings;
use crate::domain::models::webhook::{DeliveryReceipt, WebhookDeliveryPayload};
use crate::domain::services::webhook_delivery::{DeliveryError, WebhookDelivery};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use metrics::{counter, histogram};
use reqwest::{header, Client};
use sha2::Sha256;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// HTTP Webhook投递服务
///
/// 将发布事件以签名POST投递到集成目标。响应体对负载字节
/// 做HMAC-SHA256签名，同一负载的每次尝试携带完全相同的
/// 正文和幂等键，接收方据此识别重复投递。
#[derive(Clone)]
pub struct HttpWebhookDelivery {
    /// HTTP客户端
    client: Client,
    /// Webhook配置
    settings: WebhookSettings,
}

impl HttpWebhookDelivery {
    /// 创建新的投递服务实例
    ///
    /// # 参数
    ///
    /// * `settings` - Webhook配置
    ///
    /// # 返回值
    ///
    /// 返回新的投递服务实例
    pub fn new(settings: WebhookSettings) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("SeoForge-Webhook/0.1.0"),
        );
        Self {
            client: Client::builder()
                .default_headers(headers)
                .build()
                .unwrap_or_default(),
            settings,
        }
    }

    /// 构建规范化的请求体
    ///
    /// 字段顺序和键名固定，同一负载的序列化结果逐字节稳定，
    /// 签名对该确切字节序列计算。
    fn canonical_body(payload: &WebhookDeliveryPayload) -> Result<String, DeliveryError> {
        let body = serde_json::json!({
            "article": payload.article,
            "articleId": payload.article_id,
            "projectId": payload.project_id,
            "integrationId": payload.integration_id,
            "event": payload.event_name(),
        });
        Ok(serde_json::to_string(&body)?)
    }

    /// 对请求体字节计算HMAC-SHA256签名
    fn sign(secret: &str, body: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(body.as_bytes());
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    /// 解析接收方的成功响应
    ///
    /// 2xx的JSON响应体中提取`externalId`/`id`和`url`/`link`，
    /// 非JSON或空响应体返回空回执。
    fn parse_receipt(body: &str) -> DeliveryReceipt {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
            return DeliveryReceipt::default();
        };

        let pick = |keys: &[&str]| {
            keys.iter()
                .filter_map(|k| value.get(k))
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .next()
        };

        DeliveryReceipt {
            external_id: pick(&["externalId", "id"]),
            url: pick(&["url", "link"]),
            raw: Some(value),
        }
    }
}

#[async_trait]
impl WebhookDelivery for HttpWebhookDelivery {
    async fn deliver_publish(
        &self,
        payload: &WebhookDeliveryPayload,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let body = Self::canonical_body(payload)?;
        let signature = Self::sign(&payload.secret, &body);
        let idempotency_key = payload.idempotency_key();
        let event = payload.event_name().to_string();

        let max_attempts = self.settings.max_attempts.max(1);
        let mut last_status: Option<u16> = None;
        let mut last_body = String::new();

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let backoff = self.settings.retry_base_ms * 2u64.pow(attempt - 2);
                sleep(Duration::from_millis(backoff)).await;
            }

            counter!("webhook_delivery_attempts_total").increment(1);
            let start = std::time::Instant::now();

            let response = self
                .client
                .post(&payload.target_url)
                .header(header::CONTENT_TYPE, "application/json")
                .header("X-Signature", &signature)
                .header("X-Idempotency", &idempotency_key)
                .header("X-Event", &event)
                .body(body.clone())
                .timeout(Duration::from_secs(self.settings.timeout_secs))
                .send()
                .await;

            histogram!("webhook_delivery_duration_seconds")
                .record(start.elapsed().as_secs_f64());

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    last_status = Some(status.as_u16());
                    let text = resp.text().await.unwrap_or_default();

                    if status.is_success() {
                        info!(
                            article_id = %payload.article_id,
                            target = %payload.target_url,
                            attempt,
                            "Webhook delivered"
                        );
                        counter!("webhook_delivery_success_total").increment(1);
                        return Ok(Self::parse_receipt(&text));
                    }

                    warn!(
                        article_id = %payload.article_id,
                        target = %payload.target_url,
                        attempt,
                        status = status.as_u16(),
                        "Webhook delivery attempt failed"
                    );
                    last_body = text.chars().take(512).collect();
                    counter!("webhook_delivery_failed_total", "reason" => "http_error")
                        .increment(1);
                }
                Err(e) => {
                    warn!(
                        article_id = %payload.article_id,
                        target = %payload.target_url,
                        attempt,
                        error = %e,
                        "Webhook delivery attempt failed"
                    );
                    last_status = None;
                    last_body = e.to_string();
                    counter!("webhook_delivery_failed_total", "reason" => "network_error")
                        .increment(1);
                }
            }
        }

        error!(
            article_id = %payload.article_id,
            target = %payload.target_url,
            attempts = max_attempts,
            "Webhook delivery exhausted retries"
        );
        counter!("webhook_dead_letter_total").increment(1);

        Err(DeliveryError::Exhausted {
            attempts: max_attempts,
            last_status,
            last_body,
        })
    }
}
