// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::SchedulerSettings;
use crate::domain::models::article::{Article, ArticleStatus, Site};
use crate::domain::models::job::{EnqueueInput, JobType};
use crate::domain::repositories::content_repository::{ArticleRepository, SiteRepository};
use crate::queue::job_queue::JobQueue;
use crate::utils::clock::Clock;
use chrono::Duration;
use metrics::counter;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration as TokioDuration};
use tracing::{error, info, warn};

/// 每日调度器
///
/// 定期扫描所有活跃站点，将状态推进为作业：到期的计划条目
/// 产出草稿生成作业，带自动发布集成的到期草稿产出发布作业。
/// 单个站点或条目的失败只记录日志，扫描本身从不中断。
pub struct DailyScheduler {
    /// 站点仓库
    sites: Arc<dyn SiteRepository>,
    /// 文章仓库
    articles: Arc<dyn ArticleRepository>,
    /// 作业队列
    queue: Arc<JobQueue>,
    /// 注入的时钟
    clock: Arc<dyn Clock>,
    /// 调度器配置
    settings: SchedulerSettings,
}

impl DailyScheduler {
    /// 创建新的调度器实例
    ///
    /// # 参数
    ///
    /// * `sites` - 站点仓库
    /// * `articles` - 文章仓库
    /// * `queue` - 作业队列
    /// * `clock` - 时钟
    /// * `settings` - 调度器配置
    ///
    /// # 返回值
    ///
    /// 返回新的调度器实例
    pub fn new(
        sites: Arc<dyn SiteRepository>,
        articles: Arc<dyn ArticleRepository>,
        queue: Arc<JobQueue>,
        clock: Arc<dyn Clock>,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            sites,
            articles,
            queue,
            clock,
            settings,
        }
    }

    /// 启动调度器后台任务
    ///
    /// # 返回值
    ///
    /// 返回后台任务的句柄
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        let scheduler = self;
        tokio::spawn(async move {
            let period = TokioDuration::from_secs(scheduler.settings.interval_hours * 3600);
            let mut ticker = interval(period);

            loop {
                ticker.tick().await;
                info!("Daily scheduler sweep started");
                scheduler.run_once().await;
            }
        })
    }

    /// 执行一次完整扫描
    ///
    /// 遍历所有活跃站点，每个站点独立处理；任何站点的错误
    /// 都不会影响其余站点。
    pub async fn run_once(&self) {
        let sites = match self.sites.find_active_sites().await {
            Ok(sites) => sites,
            Err(e) => {
                error!("Scheduler failed to list active sites: {}", e);
                return;
            }
        };

        for site in sites {
            if let Err(e) = self.process_site(&site).await {
                error!(site_id = %site.id, "Scheduler failed to process site: {}", e);
            }
        }

        counter!("scheduler_sweeps_total").increment(1);
    }

    async fn process_site(&self, site: &Site) -> anyhow::Result<()> {
        self.enqueue_due_generations(site).await?;
        self.enqueue_auto_publishes(site).await?;
        Ok(())
    }

    /// 为到期的计划条目排队草稿生成作业
    ///
    /// 计划日期已到且尚无草稿的条目各产出一个Generate作业，
    /// 数量以站点剩余额度为上限。站点关闭排队时跳过。
    async fn enqueue_due_generations(&self, site: &Site) -> anyhow::Result<()> {
        if !site.queueing_enabled {
            return Ok(());
        }

        let today = self.clock.now().date_naive();
        let due = self.sites.find_due_plan_items(site.id, today).await?;
        if due.is_empty() {
            return Ok(());
        }

        let credits = self.sites.remaining_credits(site.id).await?;
        if credits == 0 {
            warn!(site_id = %site.id, "Site has no remaining generation credits");
            return Ok(());
        }

        for item in due.into_iter().take(credits as usize) {
            let input = EnqueueInput::new(
                JobType::Generate,
                site.id,
                serde_json::json!({ "plan_item_id": item.id }),
            );
            // Per-item failures are logged; the rest of the sweep continues
            if let Err(e) = self.queue.enqueue(input).await {
                error!(
                    site_id = %site.id,
                    plan_item_id = %item.id,
                    "Failed to queue draft generation: {}", e
                );
                continue;
            }
            counter!("scheduler_generate_jobs_total").increment(1);
            info!(site_id = %site.id, plan_item_id = %item.id, "Queued draft generation");
        }

        Ok(())
    }

    /// 为到期的草稿排队发布作业
    ///
    /// 仅对启用自动发布的集成生效。计划日期早于今天减去
    /// 缓冲天数、且正文达到最小长度的草稿被排队发布。
    async fn enqueue_auto_publishes(&self, site: &Site) -> anyhow::Result<()> {
        let Some(integration) = site.integration.as_ref() else {
            return Ok(());
        };
        if !integration.auto_publish {
            return Ok(());
        }

        let cutoff =
            self.clock.now().date_naive() - Duration::days(self.settings.publish_buffer_days);
        let drafts = self.articles.find_publishable_drafts(site.id, cutoff).await?;

        for draft in drafts {
            if !self.is_publishable(&draft) {
                continue;
            }

            let input = EnqueueInput::new(
                JobType::Publish,
                site.id,
                serde_json::json!({
                    "article_id": draft.id,
                    "integration_id": integration.id,
                }),
            );
            if let Err(e) = self.queue.enqueue(input).await {
                error!(
                    site_id = %site.id,
                    article_id = %draft.id,
                    "Failed to queue auto-publish: {}", e
                );
                continue;
            }
            counter!("scheduler_publish_jobs_total").increment(1);
            info!(site_id = %site.id, article_id = %draft.id, "Queued auto-publish");
        }

        Ok(())
    }

    fn is_publishable(&self, article: &Article) -> bool {
        if article.status != ArticleStatus::Draft {
            return false;
        }
        if article.content.body_html.chars().count() < self.settings.min_body_chars {
            warn!(
                article_id = %article.id,
                "Draft body below minimum length, skipping auto-publish"
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::article::{PlanItem, PortableArticle, PublishIntegration};
    use crate::domain::models::job::Job;
    use crate::domain::repositories::job_repository::{JobFilters, JobRepository, RepositoryError};
    use crate::infrastructure::repositories::memory_content_repo::{
        MemoryArticleRepository, MemorySiteRepository,
    };
    use crate::infrastructure::repositories::memory_job_repo::MemoryJobRepository;
    use crate::utils::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn settings() -> SchedulerSettings {
        SchedulerSettings {
            interval_hours: 24,
            publish_buffer_days: 2,
            min_body_chars: 10,
        }
    }

    fn site(queueing: bool, integration: Option<PublishIntegration>) -> Site {
        Site {
            id: Uuid::new_v4(),
            url: "https://example.com".to_string(),
            active: true,
            queueing_enabled: queueing,
            integration,
        }
    }

    fn integration(auto_publish: bool) -> PublishIntegration {
        PublishIntegration {
            id: Uuid::new_v4(),
            target_url: "https://cms.example.com/hook".to_string(),
            secret: "s3cret".to_string(),
            auto_publish,
        }
    }

    fn draft(site_id: Uuid, planned: chrono::NaiveDate, body: &str) -> Article {
        Article {
            id: Uuid::new_v4(),
            site_id,
            plan_item_id: None,
            content: PortableArticle {
                title: "T".to_string(),
                slug: "t".to_string(),
                body_html: body.to_string(),
                description: None,
                keywords: vec![],
            },
            status: ArticleStatus::Draft,
            planned_date: Some(planned),
            created_at: Utc::now(),
        }
    }

    /// Job store whose next `create` calls fail, for sweep resilience tests
    struct FlakyJobRepository {
        inner: MemoryJobRepository,
        failures: AtomicUsize,
    }

    #[async_trait]
    impl JobRepository for FlakyJobRepository {
        async fn create(&self, job: &Job) -> Result<Job, RepositoryError> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(RepositoryError::Storage("store unavailable".to_string()));
            }
            self.inner.create(job).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
            self.inner.find_by_id(id).await
        }

        async fn update(&self, job: &Job) -> Result<Job, RepositoryError> {
            self.inner.update(job).await
        }

        async fn reserve_next(
            &self,
            filters: &JobFilters,
            now: DateTime<Utc>,
        ) -> Result<Option<Job>, RepositoryError> {
            self.inner.reserve_next(filters, now).await
        }

        async fn list(&self, filters: &JobFilters) -> Result<Vec<Job>, RepositoryError> {
            self.inner.list(filters).await
        }

        async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
            self.inner.delete(id).await
        }
    }

    struct Fixture {
        sites: Arc<MemorySiteRepository>,
        articles: Arc<MemoryArticleRepository>,
        queue: Arc<JobQueue>,
        scheduler: DailyScheduler,
    }

    fn fixture() -> Fixture {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 6, 0, 0).unwrap();
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::fixed(now));
        let sites = Arc::new(MemorySiteRepository::new());
        let articles = Arc::new(MemoryArticleRepository::new());
        let queue = Arc::new(JobQueue::new(
            Arc::new(MemoryJobRepository::new()),
            clock.clone(),
        ));
        let scheduler = DailyScheduler::new(
            sites.clone(),
            articles.clone(),
            queue.clone(),
            clock,
            settings(),
        );
        Fixture {
            sites,
            articles,
            queue,
            scheduler,
        }
    }

    #[tokio::test]
    async fn test_due_plan_items_become_generate_jobs() {
        let f = fixture();
        let site = site(true, None);
        f.sites.insert_site(site.clone());
        f.sites.insert_plan_item(PlanItem {
            id: Uuid::new_v4(),
            site_id: site.id,
            keyword: "rust crawler".to_string(),
            planned_date: chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            draft_article_id: None,
        });

        f.scheduler.run_once().await;

        let jobs = f.queue.list(&Default::default()).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_type, JobType::Generate);
        assert_eq!(jobs[0].project_id, site.id);
    }

    #[tokio::test]
    async fn test_generation_respects_credits() {
        let f = fixture();
        let site = site(true, None);
        f.sites.insert_site(site.clone());
        f.sites.set_credits(site.id, 1);
        for day in 10..13 {
            f.sites.insert_plan_item(PlanItem {
                id: Uuid::new_v4(),
                site_id: site.id,
                keyword: format!("kw-{}", day),
                planned_date: chrono::NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
                draft_article_id: None,
            });
        }

        f.scheduler.run_once().await;

        let jobs = f.queue.list(&Default::default()).await.unwrap();
        assert_eq!(jobs.len(), 1, "only one credit available");
    }

    #[tokio::test]
    async fn test_queueing_disabled_skips_generation() {
        let f = fixture();
        let site = site(false, None);
        f.sites.insert_site(site.clone());
        f.sites.insert_plan_item(PlanItem {
            id: Uuid::new_v4(),
            site_id: site.id,
            keyword: "kw".to_string(),
            planned_date: chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            draft_article_id: None,
        });

        f.scheduler.run_once().await;

        assert!(f.queue.list(&Default::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_auto_publish_enqueues_due_drafts() {
        let f = fixture();
        let site = site(false, Some(integration(true)));
        f.sites.insert_site(site.clone());

        // Well past the 2-day buffer, body long enough
        f.articles.insert(draft(
            site.id,
            chrono::NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            "<p>long enough body</p>",
        ));
        // Too recent: inside the buffer window
        f.articles.insert(draft(
            site.id,
            chrono::NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            "<p>long enough body</p>",
        ));
        // Old enough but body too short
        f.articles.insert(draft(
            site.id,
            chrono::NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            "<p></p>",
        ));

        f.scheduler.run_once().await;

        let jobs = f.queue.list(&Default::default()).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].job_type, JobType::Publish);
        assert!(jobs[0].payload.get("article_id").is_some());
        assert!(jobs[0].payload.get("integration_id").is_some());
    }

    #[tokio::test]
    async fn test_auto_publish_disabled_skips_drafts() {
        let f = fixture();
        let site = site(false, Some(integration(false)));
        f.sites.insert_site(site.clone());
        f.articles.insert(draft(
            site.id,
            chrono::NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            "<p>long enough body</p>",
        ));

        f.scheduler.run_once().await;

        assert!(f.queue.list(&Default::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_item_enqueue_failure_does_not_abort_sweep() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 6, 0, 0).unwrap();
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::fixed(now));
        let sites = Arc::new(MemorySiteRepository::new());
        let articles = Arc::new(MemoryArticleRepository::new());
        let queue = Arc::new(JobQueue::new(
            Arc::new(FlakyJobRepository {
                inner: MemoryJobRepository::new(),
                failures: AtomicUsize::new(1),
            }),
            clock.clone(),
        ));
        let scheduler = DailyScheduler::new(
            sites.clone(),
            articles.clone(),
            queue.clone(),
            clock,
            settings(),
        );

        let site = site(true, Some(integration(true)));
        sites.insert_site(site.clone());
        for day in [13, 14] {
            sites.insert_plan_item(PlanItem {
                id: Uuid::new_v4(),
                site_id: site.id,
                keyword: format!("kw-{}", day),
                planned_date: chrono::NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
                draft_article_id: None,
            });
        }
        articles.insert(draft(
            site.id,
            chrono::NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            "<p>long enough body</p>",
        ));

        scheduler.run_once().await;

        // The first generate enqueue hits the injected failure; the second
        // plan item and the auto-publish pass still produce their jobs
        let jobs = queue.list(&Default::default()).await.unwrap();
        let generates = jobs.iter().filter(|j| j.job_type == JobType::Generate).count();
        let publishes = jobs.iter().filter(|j| j.job_type == JobType::Publish).count();
        assert_eq!(generates, 1);
        assert_eq!(publishes, 1);
    }
}
