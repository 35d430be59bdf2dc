// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::crawl::{Heading, PageLink};
use crate::utils::url_utils::resolve_url;
use scraper::{Html, Selector};
use url::Url;

/// 提取出的页面内容
#[derive(Debug, Default)]
pub struct ExtractedPage {
    /// 页面标题
    pub title: Option<String>,
    /// meta描述
    pub description: Option<String>,
    /// h1-h3标题，按文档顺序
    pub headings: Vec<Heading>,
    /// 解析为绝对地址的出链
    pub links: Vec<PageLink>,
}

/// 从渲染后的HTML中提取标题、描述、标题层级和出链
///
/// 相对链接相对于当前页面URL解析；fragment、mailto和
/// javascript链接被忽略。
pub fn extract_page(html: &str, page_url: &Url) -> ExtractedPage {
    let document = Html::parse_document(html);

    let title = Selector::parse("title").ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
    });

    let description = Selector::parse(r#"meta[name="description"]"#).ok().and_then(|sel| {
        document
            .select(&sel)
            .next()
            .and_then(|el| el.value().attr("content"))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    });

    let mut headings = Vec::new();
    if let Ok(sel) = Selector::parse("h1, h2, h3") {
        for element in document.select(&sel) {
            let content = element.text().collect::<String>().trim().to_string();
            if !content.is_empty() {
                headings.push(Heading {
                    tag: element.value().name().to_string(),
                    content,
                });
            }
        }
    }

    let mut links = Vec::new();
    if let Ok(sel) = Selector::parse("a") {
        for element in document.select(&sel) {
            if let Some(href) = element.value().attr("href") {
                // Ignore fragment identifiers, mailto and javascript links
                if href.starts_with('#')
                    || href.starts_with("mailto:")
                    || href.starts_with("javascript:")
                {
                    continue;
                }

                if let Ok(url) = resolve_url(page_url, href) {
                    // Only keep http/https links
                    if url.scheme() == "http" || url.scheme() == "https" {
                        let text = element.text().collect::<String>().trim().to_string();
                        links.push(PageLink {
                            href: url.to_string(),
                            text: if text.is_empty() { None } else { Some(text) },
                        });
                    }
                }
            }
        }
    }

    ExtractedPage {
        title,
        description,
        headings,
        links,
    }
}
