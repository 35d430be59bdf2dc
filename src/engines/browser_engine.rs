// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::{EngineError, PageEngine, RenderedPage};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{EventResponseReceived, ResourceType};
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::OnceCell;

// Global browser instance to avoid re-launching Chrome on every page fetch.
static BROWSER_INSTANCE: OnceCell<Browser> = OnceCell::const_new();

// Asynchronously gets or initializes the shared browser instance.
// This function ensures that the browser is launched only once.
pub async fn get_browser() -> Result<&'static Browser, EngineError> {
    BROWSER_INSTANCE
        .get_or_try_init(|| async {
            let remote_debugging_url = std::env::var("CHROMIUM_REMOTE_DEBUGGING_URL").ok();

            let (browser, mut handler) = if let Some(ref url) = remote_debugging_url {
                tracing::info!("Connecting to remote Chrome instance at: {}", url);
                Browser::connect(url).await.map_err(|e| {
                    EngineError::Other(format!("Failed to connect to remote Chrome: {}", e))
                })?
            } else {
                let mut builder = BrowserConfig::builder()
                    .no_sandbox()
                    .request_timeout(Duration::from_secs(30));

                builder = builder.arg("--disable-gpu").arg("--disable-dev-shm-usage");

                Browser::launch(builder.build().map_err(|e| EngineError::Other(e.to_string()))?)
                    .await
                    .map_err(|e| EngineError::Other(e.to_string()))?
            };

            // Spawn a handler to process browser events
            tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            Ok(browser)
        })
        .await
}

/// 浏览器引擎
///
/// 基于chromiumoxide实现的无头浏览器渲染引擎。
/// 浏览器实例全局共享，每次抓取打开一个新页面并保证关闭。
pub struct BrowserEngine {
    user_agent: String,
}

impl BrowserEngine {
    /// 创建新的浏览器引擎实例
    pub fn new(user_agent: String) -> Self {
        Self { user_agent }
    }

    async fn navigate_and_capture(
        &self,
        page: &chromiumoxide::Page,
        url: &str,
    ) -> Result<RenderedPage, EngineError> {
        page.set_user_agent(self.user_agent.as_str())
            .await
            .map_err(|e| EngineError::Other(e.to_string()))?;

        // Listen for the main document response to observe the HTTP status
        let mut responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| EngineError::Other(e.to_string()))?;

        page.goto(url)
            .await
            .map_err(|e| EngineError::Navigation(e.to_string()))?;

        // Best-effort network settle; failure to settle is non-fatal
        let _ = tokio::time::timeout(Duration::from_secs(2), page.wait_for_navigation()).await;

        let status = {
            let mut observed = 200;
            while let Ok(Some(event)) =
                tokio::time::timeout(Duration::from_millis(500), responses.next()).await
            {
                if event.r#type == ResourceType::Document {
                    observed = event.response.status as i32;
                    break;
                }
            }
            observed
        };

        let html = page
            .content()
            .await
            .map_err(|e| EngineError::Other(e.to_string()))?;

        Ok(RenderedPage { status, html })
    }
}

#[async_trait]
impl PageEngine for BrowserEngine {
    /// 渲染页面并捕获JS执行后的DOM
    ///
    /// # 参数
    ///
    /// * `url` - 页面URL
    /// * `timeout` - 单页超时时间
    ///
    /// # 返回值
    ///
    /// * `Ok(RenderedPage)` - 渲染结果
    /// * `Err(EngineError)` - 导航失败或超时
    async fn render(&self, url: &str, timeout: Duration) -> Result<RenderedPage, EngineError> {
        let browser = get_browser().await?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::Other(e.to_string()))?;

        // Only the navigation is raced against the timeout; the page handle
        // stays out of the timed future so it is closed on every path
        let result = match tokio::time::timeout(timeout, self.navigate_and_capture(&page, url)).await
        {
            Ok(result) => result,
            Err(_) => Err(EngineError::Timeout),
        };

        // One page per fetch, closed on success, failure and timeout alike
        let _ = page.close().await;

        result
    }
}
