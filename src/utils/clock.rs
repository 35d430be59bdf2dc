// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 时钟特质
///
/// 为队列和调度器提供可注入的时间源，便于对`run_at`比较
/// 等时间相关逻辑进行确定性测试。
pub trait Clock: Send + Sync {
    /// 获取当前UTC时间
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
///
/// 生产环境使用的默认时钟实现
#[derive(Debug, Default, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// 手动时钟
///
/// 测试用时钟，时间只在显式调用`advance`或`set`时前进
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Arc<parking_lot::Mutex<Option<DateTime<Utc>>>>,
}

impl ManualClock {
    /// 创建固定在给定时间点的手动时钟
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(parking_lot::Mutex::new(Some(at))),
        }
    }

    /// 将时钟前进指定的时长
    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock();
        let base = guard.unwrap_or_else(Utc::now);
        *guard = Some(base + by);
    }

    /// 将时钟设置为指定时间点
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = Some(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().unwrap_or_else(Utc::now)
    }
}
