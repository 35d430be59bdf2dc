// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use seoforge::config::settings::CrawlerSettings;
use seoforge::engines::traits::{EngineError, PageEngine, RenderedPage};
use std::time::Duration;

/// Plain HTTP page engine for integration tests
///
/// Fetches pages with reqwest instead of a headless browser so the
/// frontier can be exercised against a wiremock server.
pub struct HttpEngine {
    client: reqwest::Client,
}

impl HttpEngine {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageEngine for HttpEngine {
    async fn render(&self, url: &str, timeout: Duration) -> Result<RenderedPage, EngineError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| EngineError::Navigation(e.to_string()))?;

        let status = response.status().as_u16() as i32;
        let html = response.text().await.unwrap_or_default();
        Ok(RenderedPage { status, html })
    }
}

/// Crawler settings tuned for fast tests
pub fn test_crawler_settings() -> CrawlerSettings {
    CrawlerSettings {
        user_agent: "SeoForgeBot/0.1".to_string(),
        default_max_pages: 50,
        page_timeout_secs: 5,
        fetch_timeout_secs: 2,
        sitemap_url_cap: 1000,
        sitemap_file_cap: 10,
    }
}
