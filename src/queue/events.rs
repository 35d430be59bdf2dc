// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::JobType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// 作业生命周期事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobEventKind {
    /// 作业已入队
    Enqueued,
    /// 作业已被预定并开始执行
    Started,
    /// 作业执行成功
    Succeeded,
    /// 作业执行失败
    Failed,
    /// 作业被释放回队列
    Released,
}

/// 作业生命周期事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    /// 作业ID
    pub job_id: Uuid,
    /// 所属项目ID
    pub project_id: Uuid,
    /// 作业类型
    pub job_type: JobType,
    /// 事件类型
    pub kind: JobEventKind,
    /// 事件时间
    pub at: DateTime<Utc>,
}

/// 作业事件总线
///
/// 基于广播通道的订阅注册表，作为字段组合进队列而不是
/// 继承某个事件发射器基类。没有订阅者时事件被静默丢弃；
/// 落后的订阅者可能丢失事件——这是可观测性通道，
/// 不承载正确性。
#[derive(Debug, Clone)]
pub struct JobEventBus {
    sender: broadcast::Sender<JobEvent>,
}

impl Default for JobEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl JobEventBus {
    /// 创建指定容量的事件总线
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 订阅后续的生命周期事件
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.sender.subscribe()
    }

    /// 发布一个事件
    pub fn emit(&self, event: JobEvent) {
        // A send error only means there are no subscribers right now
        let _ = self.sender.send(event);
    }
}
