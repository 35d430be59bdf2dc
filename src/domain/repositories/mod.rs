// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 定义数据持久化的抽象接口，由基础设施层提供具体实现。
/// 作业仓库是队列语义的唯一依赖；站点/文章/爬取结果仓库
/// 是调度器和工作器消费的协作方窄接口。
pub mod content_repository;
pub mod job_repository;
