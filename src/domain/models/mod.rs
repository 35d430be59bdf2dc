// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 包含系统的核心业务实体：
/// - 作业（job）：异步工作单元及其生命周期状态机
/// - 爬取（crawl）：爬取预算和页面结果
/// - 文章（article）：可移植文章、站点和内容计划
/// - Webhook（webhook）：发布投递负载和回执
pub mod article;
pub mod crawl;
pub mod job;
pub mod webhook;
