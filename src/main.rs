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

use seoforge::config::settings::Settings;
use seoforge::crawler::frontier::CrawlFrontier;
use seoforge::domain::services::draft_service::LlmDraftEngine;
use seoforge::engines::browser_engine::BrowserEngine;
use seoforge::infrastructure::repositories::memory_content_repo::{
    MemoryArticleRepository, MemoryCrawlResultRepository, MemorySiteRepository,
};
use seoforge::infrastructure::repositories::memory_job_repo::MemoryJobRepository;
use seoforge::infrastructure::services::http_webhook_delivery::HttpWebhookDelivery;
use seoforge::queue::job_queue::JobQueue;
use seoforge::queue::scheduler::DailyScheduler;
use seoforge::utils::clock::SystemClock;
use seoforge::utils::telemetry;
use seoforge::workers::job_worker::WorkerContext;
use seoforge::workers::manager::WorkerManager;
use std::sync::Arc;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting seoforge...");

    // 2. Load configuration
    let settings = Arc::new(Settings::new()?);
    info!("Configuration loaded");

    // Initialize Prometheus Metrics
    seoforge::infrastructure::metrics::init_metrics(&settings.metrics);

    // 3. Initialize Components
    let clock = Arc::new(SystemClock);
    let job_repo = Arc::new(MemoryJobRepository::new());
    let queue = Arc::new(JobQueue::new(job_repo, clock.clone()));

    let site_repo = Arc::new(MemorySiteRepository::new());
    let article_repo = Arc::new(MemoryArticleRepository::new());
    let crawl_result_repo = Arc::new(MemoryCrawlResultRepository::new());

    // Initialize Engines
    let browser_engine = Arc::new(BrowserEngine::new(settings.crawler.user_agent.clone()));
    let frontier = Arc::new(CrawlFrontier::new(
        browser_engine,
        settings.crawler.clone(),
    ));

    let delivery = Arc::new(HttpWebhookDelivery::new(settings.webhook.clone()));
    let draft_engine = Arc::new(LlmDraftEngine::new());

    // 4. Start Workers
    let mut worker_manager = WorkerManager::new(WorkerContext {
        queue: queue.clone(),
        frontier,
        crawl_results: crawl_result_repo,
        sites: site_repo.clone(),
        articles: article_repo.clone(),
        draft_engine,
        delivery,
        clock: clock.clone(),
        settings: settings.queue.clone(),
    });
    worker_manager.start_workers(settings.queue.workers);

    // 5. Start the daily scheduler
    let scheduler = Arc::new(DailyScheduler::new(
        site_repo,
        article_repo,
        queue,
        clock,
        settings.scheduler.clone(),
    ));
    let _scheduler_handle = scheduler.start();
    info!("Daily scheduler started");

    // 6. Wait for shutdown signal
    worker_manager.wait_for_shutdown().await;

    Ok(())
}
