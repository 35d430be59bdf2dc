// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::article::{Article, PlanItem, Site};
use crate::domain::models::crawl::CrawlPageResult;
use crate::domain::repositories::job_repository::RepositoryError;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

/// 站点仓库特质
///
/// 每日调度器遍历站点和内容计划时消费的协作方接口
#[async_trait]
pub trait SiteRepository: Send + Sync {
    /// 查找所有活跃站点
    async fn find_active_sites(&self) -> Result<Vec<Site>, RepositoryError>;
    /// 根据ID查找站点
    async fn find_site(&self, id: Uuid) -> Result<Option<Site>, RepositoryError>;
    /// 根据ID查找计划条目
    async fn find_plan_item(&self, id: Uuid) -> Result<Option<PlanItem>, RepositoryError>;
    /// 查找指定日期（含）之前到期且尚无草稿的计划条目
    async fn find_due_plan_items(
        &self,
        site_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<PlanItem>, RepositoryError>;
    /// 保存计划条目
    async fn save_plan_items(&self, items: &[PlanItem]) -> Result<(), RepositoryError>;
    /// 站点剩余的生成额度
    async fn remaining_credits(&self, site_id: Uuid) -> Result<u32, RepositoryError>;
}

/// 文章仓库特质
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// 为计划条目创建草稿文章
    async fn create_draft(&self, item: &PlanItem, article: Article)
        -> Result<Article, RepositoryError>;
    /// 根据ID查找文章
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, RepositoryError>;
    /// 查找计划日期早于截止日期的草稿文章
    async fn find_publishable_drafts(
        &self,
        site_id: Uuid,
        cutoff: NaiveDate,
    ) -> Result<Vec<Article>, RepositoryError>;
    /// 标记文章已发布
    async fn mark_published(&self, id: Uuid) -> Result<(), RepositoryError>;
}

/// 爬取结果仓库特质
///
/// 爬取作业完成后由工作器调用，持久化由协作方负责
#[async_trait]
pub trait CrawlResultRepository: Send + Sync {
    /// 保存一次爬取的全部页面结果
    async fn save_results(
        &self,
        project_id: Uuid,
        results: &[CrawlPageResult],
    ) -> Result<(), RepositoryError>;
    /// 取回某项目最近一次爬取的页面结果
    async fn find_by_project(&self, project_id: Uuid)
        -> Result<Vec<CrawlPageResult>, RepositoryError>;
}
