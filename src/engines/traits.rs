// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 导航错误
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// 单页超时
    #[error("Page render timed out")]
    Timeout,

    /// 其他错误
    #[error("Engine error: {0}")]
    Other(String),
}

/// 渲染后的页面
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 主文档的HTTP状态码
    pub status: i32,
    /// JS执行后的DOM序列化结果
    pub html: String,
}

/// 页面引擎特质
///
/// 为爬取前沿提供可注入的页面渲染能力。实现负责在成功和
/// 失败路径上都关闭本次抓取打开的页面资源。
#[async_trait]
pub trait PageEngine: Send + Sync {
    /// 渲染一个页面并返回JS执行后的DOM
    ///
    /// # 参数
    ///
    /// * `url` - 页面URL
    /// * `timeout` - 单页超时时间
    ///
    /// # 返回值
    ///
    /// * `Ok(RenderedPage)` - 渲染结果（HTTP>=400时status记录观察值）
    /// * `Err(EngineError)` - 网络层/导航失败或超时
    async fn render(&self, url: &str, timeout: Duration) -> Result<RenderedPage, EngineError>;
}
