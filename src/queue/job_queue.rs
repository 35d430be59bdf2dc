// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::{DomainError, EnqueueInput, Job, JobStatus};
use crate::domain::repositories::job_repository::{JobFilters, JobRepository, RepositoryError};
use crate::queue::events::{JobEvent, JobEventBus, JobEventKind};
use crate::utils::clock::Clock;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// 队列错误类型
#[derive(Error, Debug)]
pub enum QueueError {
    /// 仓库错误
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// 领域错误（负载验证失败、非法状态转换）
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// 未识别的状态值
    #[error("Unknown job status: {0}")]
    UnknownStatus(String),
}

/// 释放选项
///
/// 调用方实现退避重试时通过`run_at`推迟下次执行
#[derive(Debug, Default, Clone)]
pub struct ReleaseOptions {
    /// 新的计划执行时间
    pub run_at: Option<DateTime<Utc>>,
    /// 新的优先级
    pub priority: Option<i32>,
}

/// 作业队列
///
/// 纯调度原语：入队、按优先级/时间预定、终结和查询。
/// 队列自身不做自动重试——重试/退避策略属于调用方，
/// 调用方捕获错误后用调整过`run_at`的`release`重新入队。
pub struct JobQueue {
    /// 作业仓库
    repository: Arc<dyn JobRepository>,
    /// 生命周期事件总线
    events: JobEventBus,
    /// 注入的时钟
    clock: Arc<dyn Clock>,
}

impl JobQueue {
    /// 创建新的作业队列实例
    ///
    /// # 参数
    ///
    /// * `repository` - 作业仓库
    /// * `clock` - 时钟
    ///
    /// # 返回值
    ///
    /// 返回新的作业队列实例
    pub fn new(repository: Arc<dyn JobRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            events: JobEventBus::default(),
            clock,
        }
    }

    /// 订阅作业生命周期事件
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// 入队作业
    ///
    /// 先按作业类型声明的负载形状进行校验，不符合立即拒绝。
    /// `run_at`缺省为当前时间。
    ///
    /// # 返回值
    ///
    /// * `Ok(Job)` - 入队成功的作业
    /// * `Err(QueueError)` - 负载验证失败或仓库错误
    pub async fn enqueue(&self, input: EnqueueInput) -> Result<Job, QueueError> {
        input.job_type.validate_payload(&input.payload)?;

        let job = Job::from_input(input, self.clock.now());
        let created = self.repository.create(&job).await?;

        self.emit(&created, JobEventKind::Enqueued);
        Ok(created)
    }

    /// 预定下一个作业
    ///
    /// 在Queued且到期的作业中按优先级降序、创建时间升序选择
    /// （同优先级内按插入顺序公平）。选择与状态转换在仓库的
    /// 单个临界区内完成：Running的作业在被释放或终结之前
    /// 绝不会再次被返回。
    ///
    /// # 返回值
    ///
    /// * `Ok(Some(Reservation))` - 预定成功，持有独占处理权
    /// * `Ok(None)` - 没有符合条件的作业，调用方应退避轮询
    pub async fn reserve_next(
        &self,
        filters: &JobFilters,
    ) -> Result<Option<Reservation>, QueueError> {
        let now = self.clock.now();
        let job = match self.repository.reserve_next(filters, now).await? {
            Some(job) => job,
            None => return Ok(None),
        };

        self.emit(&job, JobEventKind::Started);

        Ok(Some(Reservation {
            job,
            repository: self.repository.clone(),
            events: self.events.clone(),
            clock: self.clock.clone(),
            settled: AtomicBool::new(false),
        }))
    }

    /// 直接覆盖作业状态
    ///
    /// 用于外部状态对账。状态字符串必须是可识别的枚举值，
    /// 作业不存在时报错。
    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<Job, QueueError> {
        let status =
            JobStatus::from_str(status).map_err(|_| QueueError::UnknownStatus(status.to_string()))?;

        let mut job = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        job.status = status;
        job.updated_at = self.clock.now();
        let updated = self.repository.update(&job).await?;
        Ok(updated)
    }

    /// 根据ID查找作业
    pub async fn get(&self, id: Uuid) -> Result<Option<Job>, QueueError> {
        Ok(self.repository.find_by_id(id).await?)
    }

    /// 按过滤条件列出作业
    pub async fn list(&self, filters: &JobFilters) -> Result<Vec<Job>, QueueError> {
        Ok(self.repository.list(filters).await?)
    }

    /// 删除作业（仅显式删除，队列从不自动删除）
    pub async fn delete(&self, id: Uuid) -> Result<(), QueueError> {
        Ok(self.repository.delete(id).await?)
    }

    fn emit(&self, job: &Job, kind: JobEventKind) {
        self.events.emit(JobEvent {
            job_id: job.id,
            project_id: job.project_id,
            job_type: job.job_type,
            kind,
            at: self.clock.now(),
        });
    }
}

/// 作业预定
///
/// 对单个Running作业的独占处理权借用。三个终结操作
/// （complete/fail/release）每个都发出生命周期事件，
/// 且对重复调用幂等：第二次调用是无操作。
pub struct Reservation {
    job: Job,
    repository: Arc<dyn JobRepository>,
    events: JobEventBus,
    clock: Arc<dyn Clock>,
    settled: AtomicBool,
}

impl Reservation {
    /// 被预定的作业
    pub fn job(&self) -> &Job {
        &self.job
    }

    /// 完成作业：Running → Succeeded
    pub async fn complete(&self) -> Result<(), QueueError> {
        if self.settled.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let now = self.clock.now();
        let job = self.current().await?.complete(now)?;
        self.repository.update(&job).await?;
        self.emit(&job, JobEventKind::Succeeded);
        Ok(())
    }

    /// 失败作业：Running → Failed，记录终态错误
    pub async fn fail(&self, error: &str) -> Result<(), QueueError> {
        if self.settled.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let now = self.clock.now();
        let job = self.current().await?.fail(error.to_string(), now)?;
        self.repository.update(&job).await?;
        self.emit(&job, JobEventKind::Failed);
        Ok(())
    }

    /// 释放作业：Running → Queued
    ///
    /// 清除开始/完成时间，可选地更新`run_at`/`priority`，
    /// 供上层实现退避重试。
    pub async fn release(&self, options: ReleaseOptions) -> Result<(), QueueError> {
        if self.settled.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let now = self.clock.now();
        let job = self
            .current()
            .await?
            .release(options.run_at, options.priority, now)?;
        self.repository.update(&job).await?;
        self.emit(&job, JobEventKind::Released);
        Ok(())
    }

    async fn current(&self) -> Result<Job, QueueError> {
        Ok(self
            .repository
            .find_by_id(self.job.id)
            .await?
            .ok_or(RepositoryError::NotFound)?)
    }

    fn emit(&self, job: &Job, kind: JobEventKind) {
        self.events.emit(JobEvent {
            job_id: job.id,
            project_id: job.project_id,
            job_type: job.job_type,
            kind,
            at: self.clock.now(),
        });
    }
}
