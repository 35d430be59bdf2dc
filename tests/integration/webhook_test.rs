// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use seoforge::config::settings::WebhookSettings;
use seoforge::domain::models::article::PortableArticle;
use seoforge::domain::models::webhook::WebhookDeliveryPayload;
use seoforge::domain::services::webhook_delivery::{DeliveryError, WebhookDelivery};
use seoforge::infrastructure::services::http_webhook_delivery::HttpWebhookDelivery;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn test_settings() -> WebhookSettings {
    WebhookSettings {
        max_attempts: 3,
        retry_base_ms: 10,
        timeout_secs: 5,
    }
}

fn test_payload(target_url: String) -> WebhookDeliveryPayload {
    WebhookDeliveryPayload {
        target_url,
        secret: "shared-secret".to_string(),
        article: PortableArticle {
            title: "Choosing a Rust crawler stack".to_string(),
            slug: "choosing-a-rust-crawler-stack".to_string(),
            body_html: "<p>Long-form body.</p>".to_string(),
            description: Some("A practical comparison.".to_string()),
            keywords: vec!["rust".to_string(), "crawler".to_string()],
        },
        article_id: Uuid::new_v4(),
        project_id: Uuid::new_v4(),
        integration_id: Uuid::new_v4(),
        event: None,
        idempotency_key: None,
    }
}

fn header_value(request: &Request, name: &str) -> Option<String> {
    request.headers.iter().find_map(|(key, values)| {
        key.as_str()
            .eq_ignore_ascii_case(name)
            .then(|| values.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(","))
    })
}

#[tokio::test]
async fn test_successful_delivery_parses_receipt_and_signs_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ext-42",
            "url": "https://cms.example.com/posts/42",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let delivery = HttpWebhookDelivery::new(test_settings());
    let payload = test_payload(format!("{}/hook", server.uri()));

    let receipt = delivery.deliver_publish(&payload).await.unwrap();
    assert_eq!(receipt.external_id.as_deref(), Some("ext-42"));
    assert_eq!(receipt.url.as_deref(), Some("https://cms.example.com/posts/42"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let signature = header_value(&requests[0], "x-signature").unwrap();
    assert!(signature.starts_with("sha256="));
    assert_eq!(
        header_value(&requests[0], "x-idempotency").unwrap(),
        format!("article:{}", payload.article_id)
    );
    assert_eq!(
        header_value(&requests[0], "x-event").unwrap(),
        "article.publish"
    );

    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body.get("articleId").and_then(|v| v.as_str()),
        Some(payload.article_id.to_string().as_str())
    );
    assert_eq!(
        body.pointer("/article/title").and_then(|v| v.as_str()),
        Some("Choosing a Rust crawler stack")
    );
    assert_eq!(body.get("event").and_then(|v| v.as_str()), Some("article.publish"));
}

#[tokio::test]
async fn test_persistent_server_error_exhausts_after_three_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .expect(3)
        .mount(&server)
        .await;

    let delivery = HttpWebhookDelivery::new(test_settings());
    let payload = test_payload(format!("{}/hook", server.uri()));

    let err = delivery.deliver_publish(&payload).await.unwrap_err();
    match err {
        DeliveryError::Exhausted {
            attempts,
            last_status,
            last_body,
        } => {
            assert_eq!(attempts, 3);
            assert_eq!(last_status, Some(500));
            assert!(last_body.contains("upstream exploded"));
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }

    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_identical_payload_produces_identical_signature_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let delivery = HttpWebhookDelivery::new(test_settings());
    let payload = test_payload(format!("{}/hook", server.uri()));

    delivery.deliver_publish(&payload).await.unwrap();
    delivery.deliver_publish(&payload).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].body, requests[1].body);
    assert_eq!(
        header_value(&requests[0], "x-signature"),
        header_value(&requests[1], "x-signature")
    );
    assert_eq!(
        header_value(&requests[0], "x-idempotency"),
        header_value(&requests[1], "x-idempotency")
    );
}

#[tokio::test]
async fn test_success_with_non_json_body_yields_empty_receipt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let delivery = HttpWebhookDelivery::new(test_settings());
    let payload = test_payload(format!("{}/hook", server.uri()));

    let receipt = delivery.deliver_publish(&payload).await.unwrap();
    assert!(receipt.external_id.is_none());
    assert!(receipt.url.is_none());
    assert!(receipt.raw.is_none());
}

#[tokio::test]
async fn test_custom_event_and_idempotency_key_are_honored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(header("x-event", "article.update"))
        .and(header("x-idempotency", "custom-key-7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let delivery = HttpWebhookDelivery::new(test_settings());
    let mut payload = test_payload(format!("{}/hook", server.uri()));
    payload.event = Some("article.update".to_string());
    payload.idempotency_key = Some("custom-key-7".to_string());

    delivery.deliver_publish(&payload).await.unwrap();
}
