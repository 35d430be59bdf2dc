// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 爬取模块
///
/// 提供站点爬取的核心能力：
/// - robots解析（robots）：fail-open的robots.txt获取与匹配
/// - 站点地图（sitemap）：站点地图/索引的有界展开
/// - 过滤器（filters）：可索引内容页面的共享过滤谓词
/// - 提取（extract）：标题/描述/标题层级/出链的DOM提取
/// - 前沿（frontier）：有界同源BFS爬取前沿
pub mod extract;
pub mod filters;
pub mod frontier;
pub mod robots;
pub mod sitemap;
