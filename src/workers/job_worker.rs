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

use anyhow::{Context, Result};
use metrics::counter;
use rand::Rng;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::settings::QueueSettings;
use crate::crawler::frontier::CrawlFrontier;
use crate::domain::models::article::{Article, ArticleStatus, PlanItem};
use crate::domain::models::crawl::CrawlBudget;
use crate::domain::models::job::{EnqueueInput, Job, JobType};
use crate::domain::models::webhook::WebhookDeliveryPayload;
use crate::domain::repositories::content_repository::{
    ArticleRepository, CrawlResultRepository, SiteRepository,
};
use crate::domain::repositories::job_repository::JobFilters;
use crate::domain::services::draft_service::DraftEngine;
use crate::domain::services::webhook_delivery::WebhookDelivery;
use crate::engines::traits::PageEngine;
use crate::queue::job_queue::{JobQueue, ReleaseOptions};
use crate::utils::clock::Clock;
use crate::workers::workflow;

/// 工作器上下文
///
/// 作业处理所需的全部协作方，按工作器共享
pub struct WorkerContext<E: PageEngine> {
    /// 作业队列
    pub queue: Arc<JobQueue>,
    /// 爬取前沿
    pub frontier: Arc<CrawlFrontier<E>>,
    /// 爬取结果仓库
    pub crawl_results: Arc<dyn CrawlResultRepository>,
    /// 站点仓库
    pub sites: Arc<dyn SiteRepository>,
    /// 文章仓库
    pub articles: Arc<dyn ArticleRepository>,
    /// 草稿引擎
    pub draft_engine: Arc<dyn DraftEngine>,
    /// Webhook投递
    pub delivery: Arc<dyn WebhookDelivery>,
    /// 注入的时钟
    pub clock: Arc<dyn Clock>,
    /// 队列配置
    pub settings: QueueSettings,
}

impl<E: PageEngine> Clone for WorkerContext<E> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            frontier: self.frontier.clone(),
            crawl_results: self.crawl_results.clone(),
            sites: self.sites.clone(),
            articles: self.articles.clone(),
            draft_engine: self.draft_engine.clone(),
            delivery: self.delivery.clone(),
            clock: self.clock.clone(),
            settings: self.settings.clone(),
        }
    }
}

/// 作业工作器
///
/// 从队列拉取作业并按类型分发。作业成功时终结预定并推进
/// 工作流；失败时在尝试次数未耗尽前带指数退避释放，否则
/// 标记为终态失败。队列为空时短暂休眠后继续轮询。
pub struct JobWorker<E: PageEngine> {
    context: WorkerContext<E>,
    worker_id: Uuid,
}

impl<E: PageEngine> JobWorker<E> {
    /// 创建新的作业工作器实例
    pub fn new(context: WorkerContext<E>) -> Self {
        Self {
            context,
            worker_id: Uuid::new_v4(),
        }
    }

    /// 运行作业工作器
    pub async fn run(&self) {
        info!("Job worker {} started", self.worker_id);
        let idle = Duration::from_millis(self.context.settings.poll_interval_ms);

        loop {
            match self.process_next().await {
                Ok(processed) => {
                    if !processed {
                        sleep(idle).await;
                    }
                }
                Err(e) => {
                    error!("Worker {} error processing job: {}", self.worker_id, e);
                    sleep(idle).await;
                }
            }
        }
    }

    /// 处理下一个作业
    ///
    /// # 返回值
    ///
    /// * `Ok(true)` - 有作业被处理
    /// * `Ok(false)` - 队列中没有符合条件的作业
    pub async fn process_next(&self) -> Result<bool> {
        let reservation = match self.context.queue.reserve_next(&JobFilters::default()).await? {
            Some(reservation) => reservation,
            None => return Ok(false),
        };

        let job = reservation.job().clone();
        match self.process_job(&job).await {
            Ok(followups) => {
                reservation.complete().await?;
                counter!("jobs_succeeded_total", "job_type" => job.job_type.to_string())
                    .increment(1);

                for input in followups {
                    if let Err(e) = self.context.queue.enqueue(input).await {
                        error!(job_id = %job.id, "Failed to enqueue follow-up job: {}", e);
                    }
                }
            }
            Err(e) => {
                counter!("jobs_failed_attempts_total", "job_type" => job.job_type.to_string())
                    .increment(1);

                if job.attempts < self.context.settings.max_attempts {
                    let delay = self.backoff(job.attempts);
                    warn!(
                        job_id = %job.id,
                        attempt = job.attempts,
                        delay_secs = delay.num_seconds(),
                        "Job failed, releasing for retry: {}", e
                    );
                    reservation
                        .release(ReleaseOptions {
                            run_at: Some(self.context.clock.now() + delay),
                            priority: None,
                        })
                        .await?;
                } else {
                    error!(
                        job_id = %job.id,
                        attempts = job.attempts,
                        "Job failed permanently: {}", e
                    );
                    reservation.fail(&e.to_string()).await?;
                }
            }
        }

        Ok(true)
    }

    /// 失败后的退避延迟：指数退避加抖动
    fn backoff(&self, attempts: i32) -> chrono::Duration {
        let base = self.context.settings.backoff_base_secs * 2u64.pow(attempts.max(1) as u32 - 1);
        let jitter = rand::thread_rng().gen_range(0..base / 2 + 1);
        chrono::Duration::seconds((base + jitter) as i64)
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, job_type = %job.job_type))]
    async fn process_job(&self, job: &Job) -> Result<Vec<EnqueueInput>> {
        info!("Processing job");
        match job.job_type {
            JobType::Crawl => self.handle_crawl(job).await,
            JobType::Discovery => self.handle_discovery(job).await,
            JobType::Plan => self.handle_plan(job).await,
            JobType::Generate => self.handle_generate(job).await,
            JobType::Publish => self.handle_publish(job).await,
        }
    }

    /// 爬取作业：遍历站点并持久化页面结果
    async fn handle_crawl(&self, job: &Job) -> Result<Vec<EnqueueInput>> {
        let site_url = job
            .payload
            .get("site_url")
            .and_then(|v| v.as_str())
            .context("crawl payload missing 'site_url'")?;

        let defaults = self.context.frontier.default_budget();
        let budget = CrawlBudget {
            max_pages: job
                .payload
                .get("max_pages")
                .and_then(|v| v.as_u64())
                .map(|n| n as usize)
                .unwrap_or(defaults.max_pages),
            respect_robots: job
                .payload
                .get("respect_robots")
                .and_then(|v| v.as_bool())
                .unwrap_or(defaults.respect_robots),
            include_sitemaps: job
                .payload
                .get("include_sitemaps")
                .and_then(|v| v.as_bool())
                .unwrap_or(defaults.include_sitemaps),
        };

        let results = self.context.frontier.crawl_site(site_url, &budget).await?;
        info!(pages = results.len(), "Crawl finished");
        self.context
            .crawl_results
            .save_results(job.project_id, &results)
            .await?;

        Ok(self.chain(job, json!({ "crawl_job_id": job.id })))
    }

    /// 关键词发现作业：从爬取结果发现候选关键词
    async fn handle_discovery(&self, job: &Job) -> Result<Vec<EnqueueInput>> {
        let pages = self
            .context
            .crawl_results
            .find_by_project(job.project_id)
            .await?;
        let keywords = self.context.draft_engine.discover_keywords(&pages).await?;

        if keywords.is_empty() {
            warn!("No keywords discovered, workflow stops here");
            return Ok(Vec::new());
        }

        info!(count = keywords.len(), "Keywords discovered");
        Ok(self.chain(job, json!({ "keywords": keywords })))
    }

    /// 内容规划作业：把关键词整理为逐日的发布计划
    async fn handle_plan(&self, job: &Job) -> Result<Vec<EnqueueInput>> {
        let keywords: Vec<String> = serde_json::from_value(
            job.payload
                .get("keywords")
                .cloned()
                .context("plan payload missing 'keywords'")?,
        )
        .context("plan payload 'keywords' must be an array of strings")?;

        let today = self.context.clock.now().date_naive();
        let items: Vec<PlanItem> = keywords
            .iter()
            .enumerate()
            .map(|(i, keyword)| PlanItem {
                id: Uuid::new_v4(),
                site_id: job.project_id,
                keyword: keyword.clone(),
                planned_date: today + chrono::Duration::days(i as i64),
                draft_article_id: None,
            })
            .collect();

        self.context.sites.save_plan_items(&items).await?;
        info!(items = items.len(), "Content plan saved");

        // The first item is due today; later items are picked up by the
        // daily scheduler when their planned date arrives.
        match items.first() {
            Some(first) => Ok(self.chain(job, json!({ "plan_item_id": first.id }))),
            None => Ok(Vec::new()),
        }
    }

    /// 草稿生成作业：为计划条目生成文章草稿
    async fn handle_generate(&self, job: &Job) -> Result<Vec<EnqueueInput>> {
        let plan_item_id = payload_uuid(&job.payload, "plan_item_id")?;
        let item = self
            .context
            .sites
            .find_plan_item(plan_item_id)
            .await?
            .context("plan item not found")?;

        if item.draft_article_id.is_some() {
            info!(plan_item_id = %item.id, "Plan item already has a draft, skipping");
            return Ok(Vec::new());
        }

        let content = self
            .context
            .draft_engine
            .generate_article(&item.keyword)
            .await?;

        let article = Article {
            id: Uuid::new_v4(),
            site_id: item.site_id,
            plan_item_id: Some(item.id),
            content,
            status: ArticleStatus::Draft,
            planned_date: Some(item.planned_date),
            created_at: self.context.clock.now(),
        };

        let created = self.context.articles.create_draft(&item, article).await?;

        let mut linked = item;
        linked.draft_article_id = Some(created.id);
        self.context.sites.save_plan_items(&[linked]).await?;

        info!(article_id = %created.id, "Draft generated");
        Ok(Vec::new())
    }

    /// 发布作业：通过签名webhook投递文章
    async fn handle_publish(&self, job: &Job) -> Result<Vec<EnqueueInput>> {
        let article_id = payload_uuid(&job.payload, "article_id")?;
        let integration_id = payload_uuid(&job.payload, "integration_id")?;

        let article = self
            .context
            .articles
            .find_by_id(article_id)
            .await?
            .context("article not found")?;

        if article.status == ArticleStatus::Published {
            info!(article_id = %article.id, "Article already published, skipping");
            return Ok(Vec::new());
        }

        let site = self
            .context
            .sites
            .find_site(article.site_id)
            .await?
            .context("site not found")?;
        let integration = site
            .integration
            .filter(|i| i.id == integration_id)
            .context("integration not attached to site")?;

        let payload = WebhookDeliveryPayload {
            target_url: integration.target_url,
            secret: integration.secret,
            article: article.content.clone(),
            article_id: article.id,
            project_id: site.id,
            integration_id,
            event: None,
            idempotency_key: None,
        };

        let receipt = self.context.delivery.deliver_publish(&payload).await?;
        self.context.articles.mark_published(article.id).await?;

        info!(
            article_id = %article.id,
            external_id = receipt.external_id.as_deref().unwrap_or("-"),
            "Article published"
        );
        Ok(Vec::new())
    }

    /// 工作流链：成功的作业排队其下一阶段
    fn chain(&self, job: &Job, payload: serde_json::Value) -> Vec<EnqueueInput> {
        match workflow::next_stage(job.job_type) {
            Some(next) => vec![EnqueueInput::new(next, job.project_id, payload)],
            None => Vec::new(),
        }
    }
}

fn payload_uuid(payload: &serde_json::Value, field: &str) -> Result<Uuid> {
    let raw = payload
        .get(field)
        .and_then(|v| v.as_str())
        .with_context(|| format!("payload missing '{}'", field))?;
    Uuid::parse_str(raw).with_context(|| format!("payload field '{}' is not a UUID", field))
}
