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

use crate::config::settings::CrawlerSettings;
use crate::crawler::extract::extract_page;
use crate::crawler::filters::is_indexable_path;
use crate::crawler::robots::{fetch_robots, RobotsRules};
use crate::crawler::sitemap::fetch_sitemap_urls;
use crate::domain::models::crawl::{CrawlBudget, CrawlPageResult};
use crate::engines::traits::{EngineError, PageEngine};
use crate::utils::url_utils::{normalize_for_frontier, same_origin};
use anyhow::{Context, Result};
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// 前沿状态
///
/// 单次爬取的临时状态，完成后即丢弃，从不持久化。
/// `visited`表示已出队（不一定抓取成功）的URL，
/// `queued`与`queue`同步维护用于O(1)的在队判断。
#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<Url>,
    visited: HashSet<String>,
    queued: HashSet<String>,
}

impl FrontierState {
    fn pop(&mut self) -> Option<Url> {
        let url = self.queue.pop_front()?;
        self.queued.remove(url.as_str());
        self.visited.insert(url.as_str().to_string());
        Some(url)
    }
}

/// 爬取前沿
///
/// 维护有界的同源URL工作队列，去重、执行robots规则、
/// 渲染抓取并限制总页面数。单次爬取内部顺序执行，
/// 并发来自并行运行多个爬取作业。
pub struct CrawlFrontier<E: PageEngine> {
    /// 页面渲染引擎
    engine: Arc<E>,
    /// robots/站点地图请求使用的HTTP客户端
    client: Client,
    /// 爬虫配置
    settings: CrawlerSettings,
}

impl<E: PageEngine> CrawlFrontier<E> {
    /// 创建新的爬取前沿实例
    ///
    /// # 参数
    ///
    /// * `engine` - 页面渲染引擎
    /// * `settings` - 爬虫配置
    pub fn new(engine: Arc<E>, settings: CrawlerSettings) -> Self {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .build()
            .unwrap_or_default();
        Self {
            engine,
            client,
            settings,
        }
    }

    /// 配置驱动的默认爬取预算
    pub fn default_budget(&self) -> CrawlBudget {
        CrawlBudget {
            max_pages: self.settings.default_max_pages,
            ..CrawlBudget::default()
        }
    }

    /// 爬取一个站点
    ///
    /// 从`start_url`的源开始进行BFS遍历：种子入队（可选地用
    /// 站点地图URL补充），循环出队渲染、提取、扩展，直到
    /// 队列耗尽或达到`budget.max_pages`。
    ///
    /// # 参数
    ///
    /// * `start_url` - 起始URL
    /// * `budget` - 爬取预算
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<CrawlPageResult>)` - 按出队顺序的页面结果
    /// * `Err(anyhow::Error)` - 起始URL无法解析
    #[instrument(skip(self, budget), fields(start_url = %start_url))]
    pub async fn crawl_site(
        &self,
        start_url: &str,
        budget: &CrawlBudget,
    ) -> Result<Vec<CrawlPageResult>> {
        let seed = Url::parse(start_url).context("Invalid start URL")?;
        let origin = seed.clone();
        let fetch_timeout = Duration::from_secs(self.settings.fetch_timeout_secs);

        // 1. Robots rules, fail-open on any fetch problem
        let robots = if budget.respect_robots {
            fetch_robots(&self.client, &origin, fetch_timeout).await
        } else {
            None
        };

        let mut state = FrontierState::default();
        self.push_url(&mut state, seed.clone(), &origin, robots.as_ref(), budget);

        // 2. Sitemap seeds go through the same admission filter
        if budget.include_sitemaps {
            let declared = robots
                .as_ref()
                .map(|rules| rules.sitemaps())
                .unwrap_or_default();
            let sitemap_urls = fetch_sitemap_urls(
                &self.client,
                &origin,
                &declared,
                self.settings.sitemap_url_cap,
                self.settings.sitemap_file_cap,
                fetch_timeout,
            )
            .await;
            debug!("Sitemap seeding produced {} candidates", sitemap_urls.len());
            for url in sitemap_urls {
                self.push_url(&mut state, url, &origin, robots.as_ref(), budget);
            }
        }

        // 3. Drain loop: FIFO so shallow pages win over deep links
        let mut results: Vec<CrawlPageResult> = Vec::new();
        let page_timeout = Duration::from_secs(self.settings.page_timeout_secs);

        while results.len() < budget.max_pages {
            let url = match state.pop() {
                Some(url) => url,
                None => break,
            };

            let result = self.fetch_page(&url, page_timeout).await;

            for link in &result.links {
                if let Ok(candidate) = Url::parse(&link.href) {
                    self.push_url(&mut state, candidate, &origin, robots.as_ref(), budget);
                }
            }

            results.push(result);
        }

        info!(
            pages = results.len(),
            remaining = state.queue.len(),
            "Crawl finished"
        );

        Ok(results)
    }

    /// 尝试将候选URL加入队列
    ///
    /// 四重过滤是前沿的核心不变量：同源、未访问、未在队、
    /// （启用时）robots允许。另外应用共享的可索引路径谓词。
    /// 保证没有URL被抓取两次，也没有越界URL被抓取。
    fn push_url(
        &self,
        state: &mut FrontierState,
        candidate: Url,
        origin: &Url,
        robots: Option<&RobotsRules>,
        budget: &CrawlBudget,
    ) {
        let normalized = normalize_for_frontier(&candidate);

        if normalized.scheme() != "http" && normalized.scheme() != "https" {
            return;
        }
        if !same_origin(&normalized, origin) {
            return;
        }
        if !is_indexable_path(&normalized) {
            return;
        }
        let key = normalized.as_str();
        if state.visited.contains(key) || state.queued.contains(key) {
            return;
        }
        if budget.respect_robots {
            if let Some(rules) = robots {
                if !rules.is_allowed(normalized.as_str(), &self.settings.user_agent) {
                    debug!("Robots disallow: {}", normalized);
                    return;
                }
            }
        }

        state.queued.insert(key.to_string());
        state.queue.push_back(normalized);
    }

    /// 抓取单个页面
    ///
    /// 部分失败容忍：HTTP>=400、超时或导航错误都记录为
    /// 降级结果（html为空，status为观察值或0），不会中止爬取。
    async fn fetch_page(&self, url: &Url, timeout: Duration) -> CrawlPageResult {
        match self.engine.render(url.as_str(), timeout).await {
            Ok(rendered) if rendered.status < 400 => {
                let extracted = extract_page(&rendered.html, url);
                CrawlPageResult {
                    url: url.to_string(),
                    status: rendered.status,
                    html: rendered.html,
                    title: extracted.title,
                    description: extracted.description,
                    headings: extracted.headings,
                    links: extracted.links,
                }
            }
            Ok(rendered) => {
                warn!("Page {} returned status {}", url, rendered.status);
                CrawlPageResult::failed(url.to_string(), rendered.status)
            }
            Err(EngineError::Timeout) => {
                warn!("Page {} timed out", url);
                CrawlPageResult::failed(url.to_string(), 0)
            }
            Err(e) => {
                warn!("Page {} failed: {}", url, e);
                CrawlPageResult::failed(url.to_string(), 0)
            }
        }
    }
}
