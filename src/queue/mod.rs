// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 队列模块
///
/// 提供作业队列和调度功能：
/// - 事件（events）：生命周期事件总线
/// - 作业队列（job_queue）：入队、优先级预定、终结和查询
/// - 调度器（scheduler）：每日内容生成与自动发布扫描
pub mod events;
pub mod job_queue;
pub mod scheduler;
