// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 作业实体
///
/// 表示系统中一个待处理的异步工作单元，可以是站点爬取、
/// 关键词发现、内容规划、草稿生成或文章发布。作业具有
/// 状态机、优先级和计划执行时间等属性。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// 作业唯一标识符
    pub id: Uuid,
    /// 作业类型，决定作业的处理方式和业务逻辑
    pub job_type: JobType,
    /// 所属项目（站点）ID，用于归属和过滤
    pub project_id: Uuid,
    /// 作业负载数据，包含作业执行所需的参数
    pub payload: serde_json::Value,
    /// 作业状态，跟踪作业在其生命周期中的当前阶段
    pub status: JobStatus,
    /// 已尝试次数，每次被预定时恰好递增一次
    pub attempts: i32,
    /// 作业优先级，数值越大优先级越高
    pub priority: i32,
    /// 计划执行时间，早于该时间不会被预定
    pub run_at: DateTime<Utc>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
    /// 更新时间
    pub updated_at: DateTime<Utc>,
    /// 开始执行时间
    pub started_at: Option<DateTime<Utc>>,
    /// 完成时间
    pub finished_at: Option<DateTime<Utc>>,
    /// 终态错误信息
    pub error_message: Option<String>,
}

/// 作业类型枚举
///
/// 定义了发布流水线中支持的作业类型，每种类型对应
/// 不同的处理逻辑和负载结构。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// 站点爬取作业，遍历站点同源页面
    #[default]
    Crawl,
    /// 关键词发现作业，基于爬取结果发现候选关键词
    Discovery,
    /// 内容规划作业，将关键词整理为发布计划
    Plan,
    /// 草稿生成作业，为计划条目生成文章草稿
    Generate,
    /// 发布作业，将文章投递到CMS/webhook目标
    Publish,
}

impl JobType {
    /// 校验作业负载的形状
    ///
    /// 每种作业类型声明其必需的负载字段，入队前校验，
    /// 不符合时立即拒绝而不是接受畸形的工作单元。
    ///
    /// # 参数
    ///
    /// * `payload` - 作业负载
    ///
    /// # 返回值
    ///
    /// * `Ok(())` - 负载符合类型要求
    /// * `Err(DomainError)` - 负载缺少必需字段
    pub fn validate_payload(&self, payload: &serde_json::Value) -> Result<(), DomainError> {
        let required: &[&str] = match self {
            JobType::Crawl => &["site_url"],
            JobType::Discovery => &["crawl_job_id"],
            JobType::Plan => &["keywords"],
            JobType::Generate => &["plan_item_id"],
            JobType::Publish => &["article_id", "integration_id"],
        };

        if !payload.is_object() {
            return Err(DomainError::ValidationError(format!(
                "{} payload must be a JSON object",
                self
            )));
        }

        for field in required {
            if payload.get(field).is_none() {
                return Err(DomainError::ValidationError(format!(
                    "{} payload missing required field '{}'",
                    self, field
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobType::Crawl => write!(f, "crawl"),
            JobType::Discovery => write!(f, "discovery"),
            JobType::Plan => write!(f, "plan"),
            JobType::Generate => write!(f, "generate"),
            JobType::Publish => write!(f, "publish"),
        }
    }
}

impl FromStr for JobType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crawl" => Ok(JobType::Crawl),
            "discovery" => Ok(JobType::Discovery),
            "plan" => Ok(JobType::Plan),
            "generate" => Ok(JobType::Generate),
            "publish" => Ok(JobType::Publish),
            _ => Err(()),
        }
    }
}

/// 作业状态枚举
///
/// 表示作业在其生命周期中的不同状态。
/// 状态转换遵循以下流程：
/// Queued → Running → Succeeded/Failed，
/// Running → Queued（释放），Queued/Running → Canceled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// 已入队，作业已创建但尚未开始执行
    #[default]
    Queued,
    /// 执行中，作业已被某个工作器预定
    Running,
    /// 已成功，作业执行完成
    Succeeded,
    /// 已失败，作业执行失败且调用方未再释放重试
    Failed,
    /// 已取消，作业被外部取消
    Canceled,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Canceled => write!(f, "canceled"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "running" => Ok(JobStatus::Running),
            "succeeded" => Ok(JobStatus::Succeeded),
            "failed" => Ok(JobStatus::Failed),
            "canceled" => Ok(JobStatus::Canceled),
            _ => Err(()),
        }
    }
}

/// 领域错误类型
///
/// 表示在领域层可能发生的各种错误情况，包括状态转换错误
/// 和负载验证失败。
#[derive(Error, Debug)]
pub enum DomainError {
    /// 无效的状态转换，当作业状态转换不符合状态机规则时发生
    #[error("Invalid state transition")]
    InvalidStateTransition,

    /// 验证错误，当输入数据不符合领域规则时发生
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// 入队输入
///
/// `JobQueue::enqueue`的参数。`id`和`run_at`可由调用方提供，
/// 缺省时分别生成新ID和取当前时间。
#[derive(Debug, Clone)]
pub struct EnqueueInput {
    pub id: Option<Uuid>,
    pub job_type: JobType,
    pub project_id: Uuid,
    pub payload: serde_json::Value,
    pub priority: i32,
    pub run_at: Option<DateTime<Utc>>,
}

impl EnqueueInput {
    pub fn new(job_type: JobType, project_id: Uuid, payload: serde_json::Value) -> Self {
        Self {
            id: None,
            job_type,
            project_id,
            payload,
            priority: 0,
            run_at: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_run_at(mut self, run_at: DateTime<Utc>) -> Self {
        self.run_at = Some(run_at);
        self
    }
}

impl Job {
    /// 从入队输入创建一个新作业
    ///
    /// # 参数
    ///
    /// * `input` - 入队输入
    /// * `now` - 当前时间（由注入的时钟提供）
    ///
    /// # 返回值
    ///
    /// 返回新创建的处于Queued状态的作业实例
    pub fn from_input(input: EnqueueInput, now: DateTime<Utc>) -> Self {
        Self {
            id: input.id.unwrap_or_else(Uuid::new_v4),
            job_type: input.job_type,
            project_id: input.project_id,
            payload: input.payload,
            status: JobStatus::Queued,
            attempts: 0,
            priority: input.priority,
            run_at: input.run_at.unwrap_or(now),
            created_at: now,
            updated_at: now,
            started_at: None,
            finished_at: None,
            error_message: None,
        }
    }

    /// 启动作业
    ///
    /// 将作业状态从Queued变更为Running并递增尝试次数
    ///
    /// # 返回值
    ///
    /// * `Ok(Job)` - 成功启动的作业
    /// * `Err(DomainError)` - 状态转换失败
    pub fn start(mut self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Queued => {
                self.status = JobStatus::Running;
                self.attempts += 1;
                self.started_at = Some(now);
                self.updated_at = now;
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 完成作业
    ///
    /// 将作业状态从Running变更为Succeeded
    pub fn complete(mut self, now: DateTime<Utc>) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Running => {
                self.status = JobStatus::Succeeded;
                self.finished_at = Some(now);
                self.updated_at = now;
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 标记作业失败
    ///
    /// 将作业状态从Running变更为Failed并记录错误信息
    pub fn fail(mut self, error: String, now: DateTime<Utc>) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Running => {
                self.status = JobStatus::Failed;
                self.error_message = Some(error);
                self.finished_at = Some(now);
                self.updated_at = now;
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 释放作业
    ///
    /// 将作业从Running放回Queued，清除开始/完成时间，
    /// 可选地调整计划时间和优先级（由调用方实现退避重试）
    pub fn release(
        mut self,
        run_at: Option<DateTime<Utc>>,
        priority: Option<i32>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        match self.status {
            JobStatus::Running => {
                self.status = JobStatus::Queued;
                self.started_at = None;
                self.finished_at = None;
                if let Some(at) = run_at {
                    self.run_at = at;
                }
                if let Some(p) = priority {
                    self.priority = p;
                }
                self.updated_at = now;
                Ok(self)
            }
            _ => Err(DomainError::InvalidStateTransition),
        }
    }

    /// 判断作业在给定时刻是否可被预定
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Queued && self.run_at <= now
    }
}
