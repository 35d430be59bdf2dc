// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{Job, JobStatus, JobType};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 存储错误
    #[error("Storage error: {0}")]
    Storage(String),
    /// 记录未找到
    #[error("Job not found")]
    NotFound,
}

/// 作业查询/预定过滤条件
#[derive(Debug, Default, Clone)]
pub struct JobFilters {
    /// 限定项目ID
    pub project_id: Option<Uuid>,
    /// 限定作业类型集合
    pub types: Option<Vec<JobType>>,
    /// 限定作业状态集合（仅用于list）
    pub statuses: Option<Vec<JobStatus>>,
}

impl JobFilters {
    /// 判断作业是否匹配过滤条件（不含状态）
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(project_id) = self.project_id {
            if job.project_id != project_id {
                return false;
            }
        }
        if let Some(ref types) = self.types {
            if !types.contains(&job.job_type) {
                return false;
            }
        }
        true
    }
}

/// 作业仓库特质
///
/// 定义作业数据访问接口。`reserve_next`的选择+状态转换
/// 必须是原子的：Running状态的作业在被释放或终结之前
/// 绝不会被再次返回。
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// 创建新作业
    async fn create(&self, job: &Job) -> Result<Job, RepositoryError>;
    /// 根据ID查找作业
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Job>, RepositoryError>;
    /// 更新作业
    async fn update(&self, job: &Job) -> Result<Job, RepositoryError>;
    /// 原子地预定下一个符合条件的作业
    ///
    /// 在Queued且`run_at <= now`且匹配过滤条件的作业中，
    /// 按优先级降序、创建时间升序选择，并在同一临界区内
    /// 将其转换为Running（设置started_at、递增attempts）。
    async fn reserve_next(
        &self,
        filters: &JobFilters,
        now: DateTime<Utc>,
    ) -> Result<Option<Job>, RepositoryError>;
    /// 按过滤条件列出作业，按创建时间升序
    async fn list(&self, filters: &JobFilters) -> Result<Vec<Job>, RepositoryError>;
    /// 删除作业
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
}
