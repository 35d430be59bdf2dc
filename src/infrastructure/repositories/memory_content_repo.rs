// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::article::{Article, ArticleStatus, PlanItem, Site};
use crate::domain::models::crawl::CrawlPageResult;
use crate::domain::repositories::content_repository::{
    ArticleRepository, CrawlResultRepository, SiteRepository,
};
use crate::domain::repositories::job_repository::RepositoryError;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use uuid::Uuid;

/// 内存站点仓库
///
/// 站点与计划条目的DashMap实现，用于装配与测试
#[derive(Default)]
pub struct MemorySiteRepository {
    sites: DashMap<Uuid, Site>,
    plan_items: DashMap<Uuid, PlanItem>,
    credits: DashMap<Uuid, u32>,
}

impl MemorySiteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册站点
    pub fn insert_site(&self, site: Site) {
        self.sites.insert(site.id, site);
    }

    /// 设置站点剩余额度
    pub fn set_credits(&self, site_id: Uuid, credits: u32) {
        self.credits.insert(site_id, credits);
    }

    /// 注册计划条目
    pub fn insert_plan_item(&self, item: PlanItem) {
        self.plan_items.insert(item.id, item);
    }
}

#[async_trait]
impl SiteRepository for MemorySiteRepository {
    async fn find_active_sites(&self) -> Result<Vec<Site>, RepositoryError> {
        let mut sites: Vec<Site> = self
            .sites
            .iter()
            .filter(|entry| entry.active)
            .map(|entry| entry.clone())
            .collect();
        sites.sort_by_key(|site| site.id);
        Ok(sites)
    }

    async fn find_site(&self, id: Uuid) -> Result<Option<Site>, RepositoryError> {
        Ok(self.sites.get(&id).map(|s| s.clone()))
    }

    async fn find_plan_item(&self, id: Uuid) -> Result<Option<PlanItem>, RepositoryError> {
        Ok(self.plan_items.get(&id).map(|p| p.clone()))
    }

    async fn find_due_plan_items(
        &self,
        site_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<PlanItem>, RepositoryError> {
        let mut items: Vec<PlanItem> = self
            .plan_items
            .iter()
            .filter(|entry| {
                entry.site_id == site_id
                    && entry.planned_date <= date
                    && entry.draft_article_id.is_none()
            })
            .map(|entry| entry.clone())
            .collect();
        items.sort_by_key(|item| (item.planned_date, item.id));
        Ok(items)
    }

    async fn save_plan_items(&self, items: &[PlanItem]) -> Result<(), RepositoryError> {
        for item in items {
            self.plan_items.insert(item.id, item.clone());
        }
        Ok(())
    }

    async fn remaining_credits(&self, site_id: Uuid) -> Result<u32, RepositoryError> {
        Ok(self.credits.get(&site_id).map(|c| *c).unwrap_or(u32::MAX))
    }
}

/// 内存文章仓库
#[derive(Default)]
pub struct MemoryArticleRepository {
    articles: DashMap<Uuid, Article>,
    plan_items: DashMap<Uuid, PlanItem>,
}

impl MemoryArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接插入文章
    pub fn insert(&self, article: Article) {
        self.articles.insert(article.id, article);
    }
}

#[async_trait]
impl ArticleRepository for MemoryArticleRepository {
    async fn create_draft(
        &self,
        item: &PlanItem,
        article: Article,
    ) -> Result<Article, RepositoryError> {
        let mut linked = item.clone();
        linked.draft_article_id = Some(article.id);
        self.plan_items.insert(linked.id, linked);
        self.articles.insert(article.id, article.clone());
        Ok(article)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Article>, RepositoryError> {
        Ok(self.articles.get(&id).map(|a| a.clone()))
    }

    async fn find_publishable_drafts(
        &self,
        site_id: Uuid,
        cutoff: NaiveDate,
    ) -> Result<Vec<Article>, RepositoryError> {
        let mut drafts: Vec<Article> = self
            .articles
            .iter()
            .filter(|entry| {
                entry.site_id == site_id
                    && entry.status == ArticleStatus::Draft
                    && entry.planned_date.map(|d| d <= cutoff).unwrap_or(false)
            })
            .map(|entry| entry.clone())
            .collect();
        drafts.sort_by_key(|article| (article.planned_date, article.id));
        Ok(drafts)
    }

    async fn mark_published(&self, id: Uuid) -> Result<(), RepositoryError> {
        match self.articles.get_mut(&id) {
            Some(mut article) => {
                article.status = ArticleStatus::Published;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

/// 内存爬取结果仓库
#[derive(Default)]
pub struct MemoryCrawlResultRepository {
    results: DashMap<Uuid, Vec<CrawlPageResult>>,
}

impl MemoryCrawlResultRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CrawlResultRepository for MemoryCrawlResultRepository {
    async fn save_results(
        &self,
        project_id: Uuid,
        results: &[CrawlPageResult],
    ) -> Result<(), RepositoryError> {
        self.results.insert(project_id, results.to_vec());
        Ok(())
    }

    async fn find_by_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<CrawlPageResult>, RepositoryError> {
        Ok(self
            .results
            .get(&project_id)
            .map(|r| r.clone())
            .unwrap_or_default())
    }
}
