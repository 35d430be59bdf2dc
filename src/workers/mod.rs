// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供后台作业处理功能：
/// - 作业工作器（job_worker）：按类型分发作业并处理重试
/// - 工作流（workflow）：发布流水线的阶段推进
/// - 管理器（manager）：工作器池的启动与关闭
pub mod job_worker;
pub mod manager;
pub mod workflow;
