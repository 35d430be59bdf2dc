// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::PageEngine;
use crate::workers::job_worker::{JobWorker, WorkerContext};
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// 工作管理器
///
/// 启动固定数量的作业工作器并在收到关闭信号时停止它们
pub struct WorkerManager<E: PageEngine + 'static> {
    context: WorkerContext<E>,
    handles: Vec<JoinHandle<()>>,
}

impl<E: PageEngine + 'static> WorkerManager<E> {
    /// 创建新的工作管理器实例
    ///
    /// # 参数
    ///
    /// * `context` - 工作器上下文
    ///
    /// # 返回值
    ///
    /// 返回新的工作管理器实例
    pub fn new(context: WorkerContext<E>) -> Self {
        Self {
            context,
            handles: Vec::new(),
        }
    }

    /// 启动工作进程
    ///
    /// 创建并启动指定数量的工作进程
    ///
    /// # 参数
    ///
    /// * `count` - 要启动的工作进程数量
    pub fn start_workers(&mut self, count: usize) {
        for _ in 0..count {
            let worker = JobWorker::new(self.context.clone());

            // We spawn the worker loop on a separate task to avoid blocking the main thread
            // or the loop that spawns workers.
            let handle = tokio::spawn(async move {
                worker.run().await;
            });
            self.handles.push(handle);
        }
        info!("Started {} job workers", count);
    }

    /// 等待关闭信号并关闭工作进程
    ///
    /// 监听关闭信号并优雅地关闭所有工作进程
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }

        info!("Shutting down workers...");
        for handle in &self.handles {
            handle.abort();
        }

        info!("Workers shut down successfully");
    }
}
