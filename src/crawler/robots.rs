// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use reqwest::Client;
use robotstxt::DefaultMatcher;
use std::time::Duration;
use url::Url;

/// 解析后的robots规则
///
/// 保存原始robots.txt内容；匹配器按调用构建（匹配器有内部
/// 状态，不能跨调用复用）。
#[derive(Debug, Clone)]
pub struct RobotsRules {
    content: String,
}

impl RobotsRules {
    /// 从robots.txt内容构建规则
    pub fn parse(content: String) -> Self {
        Self { content }
    }

    /// 检查URL是否允许给定User-Agent访问
    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        let mut matcher = DefaultMatcher::default();
        matcher.one_agent_allowed_by_robots(&self.content, user_agent, url)
    }

    /// 提取`Sitemap:`指令声明的站点地图URL
    pub fn sitemaps(&self) -> Vec<String> {
        self.content
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                let lower = line.to_lowercase();
                if let Some(rest) = lower.strip_prefix("sitemap:") {
                    let offset = line.len() - rest.len();
                    let value = line[offset..].trim();
                    if value.is_empty() {
                        None
                    } else {
                        Some(value.to_string())
                    }
                } else {
                    None
                }
            })
            .collect()
    }
}

/// 获取并解析某源的robots.txt
///
/// 礼貌性（politeness）是尽力而为而不是正确性保证：非2xx响应
/// 或网络错误时返回`None`，爬取按不受限继续（fail-open）。
///
/// # 参数
///
/// * `client` - HTTP客户端
/// * `origin` - 站点源URL
/// * `timeout` - 请求超时时间
///
/// # 返回值
///
/// * `Some(RobotsRules)` - 成功获取并解析的规则
/// * `None` - 获取失败，按不受限处理
pub async fn fetch_robots(client: &Client, origin: &Url, timeout: Duration) -> Option<RobotsRules> {
    let robots_url = match origin.join("/robots.txt") {
        Ok(url) => url,
        Err(_) => return None,
    };

    let response = match client.get(robots_url.clone()).timeout(timeout).send().await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!("Failed to fetch robots.txt from {}: {}", robots_url, e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::debug!(
            "robots.txt at {} returned {}, crawling unrestricted",
            robots_url,
            response.status()
        );
        return None;
    }

    match response.text().await {
        Ok(content) => Some(RobotsRules::parse(content)),
        Err(e) => {
            tracing::warn!("Failed to read robots.txt body from {}: {}", robots_url, e);
            None
        }
    }
}
