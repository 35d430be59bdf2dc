// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use quick_xml::events::Event as XmlEvent;
use quick_xml::Reader;
use reqwest::Client;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// 解析出的站点地图文档
///
/// `<urlset>`产生页面URL，`<sitemapindex>`产生子站点地图URL
#[derive(Debug, Default)]
pub struct SitemapDocument {
    /// 页面URL
    pub pages: Vec<String>,
    /// 子站点地图URL
    pub children: Vec<String>,
}

/// 解析单个站点地图XML文档
///
/// 扫描`<loc>`文本节点；根元素为`<sitemapindex>`时按索引处理。
/// 相对地址相对于文档自身URL解析。
pub fn parse_sitemap(base: &Url, xml: &[u8]) -> SitemapDocument {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut in_loc = false;
    let mut locs: Vec<String> = Vec::new();
    let mut saw_urlset = false;
    let mut saw_sitemapindex = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(e)) => {
                if e.name().as_ref().ends_with(b"urlset") {
                    saw_urlset = true;
                } else if e.name().as_ref().ends_with(b"sitemapindex") {
                    saw_sitemapindex = true;
                } else if e.name().as_ref().ends_with(b"loc") {
                    in_loc = true;
                }
            }
            Ok(XmlEvent::End(e)) => {
                if e.name().as_ref().ends_with(b"loc") {
                    in_loc = false;
                }
            }
            Ok(XmlEvent::Text(t)) => {
                if in_loc {
                    if let Ok(text) = t.unescape() {
                        locs.push(text.to_string());
                    }
                }
            }
            Ok(XmlEvent::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    let resolve = |loc: String| -> Option<String> {
        if let Ok(parsed) = Url::parse(&loc) {
            Some(parsed.to_string())
        } else {
            base.join(&loc).map(|u| u.to_string()).ok()
        }
    };

    let resolved: Vec<String> = locs.into_iter().filter_map(resolve).collect();

    if saw_sitemapindex && !saw_urlset {
        SitemapDocument {
            pages: Vec::new(),
            children: resolved,
        }
    } else {
        SitemapDocument {
            pages: resolved,
            children: Vec::new(),
        }
    }
}

/// 获取并展开站点的sitemap.xml
///
/// 从`{origin}/sitemap.xml`和robots.txt声明的站点地图开始，
/// 用工作队列展开站点地图索引（避免递归放大），直到收集的
/// URL数达到`url_cap`或处理的站点地图文件数达到`file_cap`。
/// 单个子地图获取失败只记录日志不致命——部分站点地图数据
/// 是可接受的。
///
/// # 返回值
///
/// 去重且保序的页面URL列表
pub async fn fetch_sitemap_urls(
    client: &Client,
    origin: &Url,
    declared: &[String],
    url_cap: usize,
    file_cap: usize,
    timeout: Duration,
) -> Vec<Url> {
    let start = match origin.join("/sitemap.xml") {
        Ok(url) => url,
        Err(_) => return Vec::new(),
    };

    let mut pending: Vec<String> = vec![start.to_string()];
    pending.extend(declared.iter().cloned());
    let mut processed: HashSet<String> = HashSet::new();
    let mut seen_pages: HashSet<String> = HashSet::new();
    let mut pages: Vec<Url> = Vec::new();

    while let Some(sitemap_url) = pending.pop() {
        if pages.len() >= url_cap || processed.len() >= file_cap {
            break;
        }
        if !processed.insert(sitemap_url.clone()) {
            continue;
        }

        tracing::debug!("Fetching sitemap: {}", sitemap_url);

        let response = match client.get(&sitemap_url).timeout(timeout).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                tracing::debug!("Sitemap {} returned {}", sitemap_url, resp.status());
                continue;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch sitemap {}: {}", sitemap_url, e);
                continue;
            }
        };

        let body = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Failed to read sitemap body {}: {}", sitemap_url, e);
                continue;
            }
        };

        let base = Url::parse(&sitemap_url).unwrap_or_else(|_| start.clone());
        let document = parse_sitemap(&base, &body);

        for child in document.children {
            pending.push(child);
        }

        for page in document.pages {
            if pages.len() >= url_cap {
                break;
            }
            if let Ok(url) = Url::parse(&page) {
                if seen_pages.insert(url.to_string()) {
                    pages.push(url);
                }
            }
        }
    }

    pages
}
