// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 爬取预算
///
/// 调用方提供的单次爬取约束，在整个爬取过程中不可变。
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CrawlBudget {
    /// 最大页面数，结果数量永远不会超过该值
    pub max_pages: usize,
    /// 是否遵守robots.txt规则
    pub respect_robots: bool,
    /// 是否用站点地图URL补充种子队列
    pub include_sitemaps: bool,
}

impl Default for CrawlBudget {
    fn default() -> Self {
        Self {
            max_pages: 50,
            respect_robots: true,
            include_sitemaps: true,
        }
    }
}

/// 页面标题元素
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// 标签名（h1/h2/h3）
    pub tag: String,
    /// 标题文本内容
    pub content: String,
}

/// 页面出链
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    /// 解析后的绝对链接地址
    pub href: String,
    /// 链接文本
    pub text: Option<String>,
}

/// 爬取页面结果
///
/// 每个抓取的URL生成一个结果，创建后不再变更；
/// 抓取失败时status为观察到的HTTP状态码或0（网络层失败），
/// html为空字符串，而不是中止整个爬取。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlPageResult {
    /// 页面URL
    pub url: String,
    /// HTTP状态码，网络层失败时为0
    pub status: i32,
    /// 渲染后的HTML内容
    pub html: String,
    /// 页面标题
    pub title: Option<String>,
    /// meta描述
    pub description: Option<String>,
    /// h1-h3标题，按文档顺序
    pub headings: Vec<Heading>,
    /// 同源出链
    pub links: Vec<PageLink>,
}

impl CrawlPageResult {
    /// 创建一个表示抓取失败的降级结果
    pub fn failed(url: String, status: i32) -> Self {
        Self {
            url,
            status,
            html: String::new(),
            title: None,
            description: None,
            headings: Vec::new(),
            links: Vec::new(),
        }
    }
}
