// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::job::JobType;

/// 发布流水线的下一阶段
///
/// 站点入驻链：爬取 → 关键词发现 → 内容规划 → 草稿生成。
/// 生成与发布之间由每日调度器按计划日期推进，不在链内。
pub fn next_stage(current: JobType) -> Option<JobType> {
    match current {
        JobType::Crawl => Some(JobType::Discovery),
        JobType::Discovery => Some(JobType::Plan),
        JobType::Plan => Some(JobType::Generate),
        JobType::Generate => None,
        JobType::Publish => None,
    }
}
