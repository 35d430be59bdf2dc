// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 可移植文章
///
/// 发布投递时携带的与CMS无关的文章形状
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortableArticle {
    /// 文章标题
    pub title: String,
    /// URL slug
    pub slug: String,
    /// 渲染后的正文HTML
    pub body_html: String,
    /// 摘要描述
    pub description: Option<String>,
    /// 目标关键词
    pub keywords: Vec<String>,
}

/// 文章状态枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    /// 草稿，已生成但尚未发布
    #[default]
    Draft,
    /// 已发布
    Published,
}

/// 文章实体
///
/// 草稿生成作业的产物，发布作业的输入。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// 文章唯一标识符
    pub id: Uuid,
    /// 所属站点ID
    pub site_id: Uuid,
    /// 来源计划条目ID
    pub plan_item_id: Option<Uuid>,
    /// 文章内容
    pub content: PortableArticle,
    /// 文章状态
    pub status: ArticleStatus,
    /// 计划发布日期
    pub planned_date: Option<NaiveDate>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

/// 计划条目实体
///
/// 关键词计划中的一项，带有计划生成日期。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanItem {
    /// 条目唯一标识符
    pub id: Uuid,
    /// 所属站点ID
    pub site_id: Uuid,
    /// 目标关键词
    pub keyword: String,
    /// 计划生成日期
    pub planned_date: NaiveDate,
    /// 已生成的草稿文章ID
    pub draft_article_id: Option<Uuid>,
}

/// 发布集成配置
///
/// 站点连接的CMS/webhook发布目标。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishIntegration {
    /// 集成唯一标识符
    pub id: Uuid,
    /// 投递目标URL
    pub target_url: String,
    /// 签名密钥
    pub secret: String,
    /// 是否启用自动发布策略
    pub auto_publish: bool,
}

/// 站点实体
///
/// 每日调度器遍历的最小站点形状。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    /// 站点唯一标识符
    pub id: Uuid,
    /// 站点起始URL
    pub url: String,
    /// 是否处于活跃状态
    pub active: bool,
    /// 是否启用作业排队（生成作业）
    pub queueing_enabled: bool,
    /// 连接的发布集成
    pub integration: Option<PublishIntegration>,
}
