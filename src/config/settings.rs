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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含爬虫、队列、Webhook、调度器和指标等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 爬虫配置
    pub crawler: CrawlerSettings,
    /// 队列配置
    pub queue: QueueSettings,
    /// Webhook配置
    pub webhook: WebhookSettings,
    /// 调度器配置
    pub scheduler: SchedulerSettings,
    /// 指标配置
    pub metrics: MetricsSettings,
}

/// 爬虫配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerSettings {
    /// 爬虫User-Agent
    pub user_agent: String,
    /// 单次爬取的默认最大页面数
    pub default_max_pages: usize,
    /// 单页渲染超时时间（秒）
    pub page_timeout_secs: u64,
    /// robots.txt / 站点地图请求超时时间（秒）
    pub fetch_timeout_secs: u64,
    /// 站点地图解析收集的URL总数上限
    pub sitemap_url_cap: usize,
    /// 单次解析处理的站点地图文件数上限
    pub sitemap_file_cap: usize,
}

/// 队列配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    /// 工作器数量
    pub workers: usize,
    /// 队列为空时的轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 作业的最大尝试次数（含首次执行）
    pub max_attempts: i32,
    /// 重试退避基数（秒）
    pub backoff_base_secs: u64,
}

/// Webhook配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSettings {
    /// 投递的最大尝试次数
    pub max_attempts: u32,
    /// 尝试之间的退避基数（毫秒）
    pub retry_base_ms: u64,
    /// 单次POST超时时间（秒）
    pub timeout_secs: u64,
}

/// 调度器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// 扫描间隔（小时）
    pub interval_hours: u64,
    /// 自动发布的缓冲天数，计划日期早于该缓冲才发布
    pub publish_buffer_days: i64,
    /// 文章正文的最小字符数，低于该值不自动发布
    pub min_body_chars: usize,
}

/// 指标配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    /// 是否启用Prometheus指标导出
    pub enabled: bool,
    /// 指标HTTP监听端口
    pub port: u16,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从配置文件和环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default crawler settings
            .set_default("crawler.user_agent", "SeoforgeBot/0.1.0")?
            .set_default("crawler.default_max_pages", 50)?
            .set_default("crawler.page_timeout_secs", 30)?
            .set_default("crawler.fetch_timeout_secs", 10)?
            .set_default("crawler.sitemap_url_cap", 100_000)?
            .set_default("crawler.sitemap_file_cap", 200)?
            // Default queue settings
            .set_default("queue.workers", 5)?
            .set_default("queue.poll_interval_ms", 1000)?
            .set_default("queue.max_attempts", 3)?
            .set_default("queue.backoff_base_secs", 2)?
            // Default webhook settings
            .set_default("webhook.max_attempts", 3)?
            .set_default("webhook.retry_base_ms", 500)?
            .set_default("webhook.timeout_secs", 10)?
            // Default scheduler settings
            .set_default("scheduler.interval_hours", 24)?
            .set_default("scheduler.publish_buffer_days", 2)?
            .set_default("scheduler.min_body_chars", 200)?
            // Default metrics settings
            .set_default("metrics.enabled", true)?
            .set_default("metrics.port", 9000)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SEOFORGE").separator("__"));

        builder.build()?.try_deserialize()
    }
}
