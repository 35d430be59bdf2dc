// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::Job;
use crate::domain::repositories::job_repository::{JobFilters, JobRepository, RepositoryError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

/// 内存作业仓库
///
/// 单个互斥锁保护整个作业表。`reserve_next`的选择与状态
/// 转换发生在同一临界区内，两个工作器不可能预定到同一个
/// 作业——这是整个子系统唯一的并发正确性要求。
#[derive(Default)]
pub struct MemoryJobRepository {
    jobs: Mutex<HashMap<Uuid, Job>>,
}

impl MemoryJobRepository {
    /// 创建新的内存作业仓库实例
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for MemoryJobRepository {
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError> {
        let mut jobs = self.jobs.lock();
        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::Storage(format!(
                "Job {} already exists",
                job.id
            )));
        }
        jobs.insert(job.id, job.clone());
        Ok(job.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.lock().get(&id).cloned())
    }

    async fn update(&self, job: &Job) -> Result<Job, RepositoryError> {
        let mut jobs = self.jobs.lock();
        match jobs.get_mut(&job.id) {
            Some(existing) => {
                *existing = job.clone();
                Ok(job.clone())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn reserve_next(
        &self,
        filters: &JobFilters,
        now: DateTime<Utc>,
    ) -> Result<Option<Job>, RepositoryError> {
        let mut jobs = self.jobs.lock();

        // Priority desc, then created_at asc for fairness within a band
        let selected = jobs
            .values()
            .filter(|job| job.is_eligible(now) && filters.matches(job))
            .max_by(|a, b| {
                a.priority
                    .cmp(&b.priority)
                    .then_with(|| b.created_at.cmp(&a.created_at))
                    .then_with(|| b.id.cmp(&a.id))
            })
            .map(|job| job.id);

        let id = match selected {
            Some(id) => id,
            None => return Ok(None),
        };

        // Transition inside the same critical section
        let job = jobs
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)?
            .start(now)
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;
        jobs.insert(id, job.clone());

        Ok(Some(job))
    }

    async fn list(&self, filters: &JobFilters) -> Result<Vec<Job>, RepositoryError> {
        let jobs = self.jobs.lock();
        let mut matched: Vec<Job> = jobs
            .values()
            .filter(|job| {
                if !filters.matches(job) {
                    return false;
                }
                if let Some(ref statuses) = filters.statuses {
                    if !statuses.contains(&job.status) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(matched)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        match self.jobs.lock().remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }
}
