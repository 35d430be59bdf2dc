// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use reqwest::Client;
use seoforge::crawler::sitemap::fetch_sitemap_urls;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_xml(server: &MockServer, route: &str, xml: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(xml)
                .insert_header("content-type", "application/xml"),
        )
        .mount(server)
        .await;
}

fn urlset(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<url><loc>{}</loc></url>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
        entries
    )
}

fn sitemap_index(locs: &[String]) -> String {
    let entries: String = locs
        .iter()
        .map(|loc| format!("<sitemap><loc>{}</loc></sitemap>", loc))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
        entries
    )
}

/// Mounts an index at /sitemap.xml referencing two child urlsets with
/// three and two pages respectively.
async fn mount_indexed_site(server: &MockServer) {
    let base = server.uri();
    mount_xml(
        server,
        "/sitemap.xml",
        sitemap_index(&[
            format!("{}/sitemap-posts.xml", base),
            format!("{}/sitemap-pages.xml", base),
        ]),
    )
    .await;
    mount_xml(
        server,
        "/sitemap-posts.xml",
        urlset(&[
            format!("{}/post-1", base),
            format!("{}/post-2", base),
            format!("{}/post-3", base),
        ]),
    )
    .await;
    mount_xml(
        server,
        "/sitemap-pages.xml",
        urlset(&[format!("{}/about", base), format!("{}/contact", base)]),
    )
    .await;
}

#[tokio::test]
async fn test_sitemap_index_is_flattened_to_page_urls() {
    let server = MockServer::start().await;
    mount_indexed_site(&server).await;
    let origin = Url::parse(&server.uri()).unwrap();

    let urls = fetch_sitemap_urls(
        &Client::new(),
        &origin,
        &[],
        1000,
        10,
        Duration::from_secs(5),
    )
    .await;

    let mut paths: Vec<&str> = urls.iter().map(|u| u.path()).collect();
    paths.sort();
    assert_eq!(
        paths,
        vec!["/about", "/contact", "/post-1", "/post-2", "/post-3"]
    );
}

#[tokio::test]
async fn test_url_cap_bounds_collected_pages() {
    let server = MockServer::start().await;
    mount_indexed_site(&server).await;
    let origin = Url::parse(&server.uri()).unwrap();

    let urls = fetch_sitemap_urls(&Client::new(), &origin, &[], 4, 10, Duration::from_secs(5)).await;

    assert_eq!(urls.len(), 4, "collection stops at the URL cap");
}

#[tokio::test]
async fn test_file_cap_bounds_processed_sitemaps() {
    let server = MockServer::start().await;
    mount_indexed_site(&server).await;
    let origin = Url::parse(&server.uri()).unwrap();

    // Cap of two covers the index plus a single child
    let urls = fetch_sitemap_urls(&Client::new(), &origin, &[], 1000, 2, Duration::from_secs(5)).await;

    assert_eq!(urls.len(), 2, "only one child urlset may be expanded");
}

#[tokio::test]
async fn test_broken_child_sitemap_is_skipped() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_xml(
        &server,
        "/sitemap.xml",
        sitemap_index(&[
            format!("{}/missing.xml", base),
            format!("{}/sitemap-pages.xml", base),
        ]),
    )
    .await;
    mount_xml(
        &server,
        "/sitemap-pages.xml",
        urlset(&[format!("{}/about", base)]),
    )
    .await;
    let origin = Url::parse(&base).unwrap();

    let urls = fetch_sitemap_urls(
        &Client::new(),
        &origin,
        &[],
        1000,
        10,
        Duration::from_secs(5),
    )
    .await;

    assert_eq!(urls.len(), 1);
    assert_eq!(urls[0].path(), "/about");
}
