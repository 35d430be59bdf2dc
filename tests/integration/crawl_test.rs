// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{test_crawler_settings, HttpEngine};
use seoforge::crawler::frontier::CrawlFrontier;
use seoforge::domain::models::crawl::CrawlBudget;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn frontier() -> CrawlFrontier<HttpEngine> {
    CrawlFrontier::new(Arc::new(HttpEngine::new()), test_crawler_settings())
}

async fn mount_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_robots_disallow_is_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/about">About</a><a href="/private">Private</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/about", "<html><head><title>About</title></head></html>").await;
    mount_page(&server, "/private", "<html><body>secret</body></html>").await;

    let budget = CrawlBudget {
        max_pages: 10,
        respect_robots: true,
        include_sitemaps: false,
    };
    let results = frontier()
        .crawl_site(&format!("{}/", server.uri()), &budget)
        .await
        .unwrap();

    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert!(urls.iter().any(|u| u.ends_with("/about")));
    assert!(
        !urls.iter().any(|u| u.ends_with("/private")),
        "disallowed path must not be crawled: {:?}",
        urls
    );
}

#[tokio::test]
async fn test_robots_ignored_when_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"))
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/private">Private</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/private", "<html><body>secret</body></html>").await;

    let budget = CrawlBudget {
        max_pages: 10,
        respect_robots: false,
        include_sitemaps: false,
    };
    let results = frontier()
        .crawl_site(&format!("{}/", server.uri()), &budget)
        .await
        .unwrap();

    assert!(results.iter().any(|r| r.url.ends_with("/private")));
}

#[tokio::test]
async fn test_missing_robots_fails_open() {
    let server = MockServer::start().await;
    // No robots.txt mounted: wiremock answers 404
    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/about">About</a></body></html>"#,
    )
    .await;
    mount_page(&server, "/about", "<html><head><title>About</title></head></html>").await;

    let budget = CrawlBudget {
        max_pages: 10,
        respect_robots: true,
        include_sitemaps: false,
    };
    let results = frontier()
        .crawl_site(&format!("{}/", server.uri()), &budget)
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_sitemap_urls_seed_the_frontier() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{base}/page-a</loc></url>
  <url><loc>{base}/page-b</loc></url>
</urlset>"#
            )),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/", "<html><body>no links here</body></html>").await;
    mount_page(&server, "/page-a", "<html><head><title>A</title></head></html>").await;
    mount_page(&server, "/page-b", "<html><head><title>B</title></head></html>").await;

    let budget = CrawlBudget {
        max_pages: 10,
        respect_robots: false,
        include_sitemaps: true,
    };
    let results = frontier()
        .crawl_site(&format!("{}/", base), &budget)
        .await
        .unwrap();

    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert!(urls.iter().any(|u| u.ends_with("/page-a")));
    assert!(urls.iter().any(|u| u.ends_with("/page-b")));
}

#[tokio::test]
async fn test_robots_declared_sitemap_is_expanded() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "User-agent: *\nDisallow:\nSitemap: {base}/custom-map.xml\n"
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/custom-map.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<urlset><url><loc>{base}/hidden-page</loc></url></urlset>"#
        )))
        .mount(&server)
        .await;
    mount_page(&server, "/", "<html><body>no links</body></html>").await;
    mount_page(
        &server,
        "/hidden-page",
        "<html><head><title>Hidden</title></head></html>",
    )
    .await;

    let budget = CrawlBudget {
        max_pages: 10,
        respect_robots: true,
        include_sitemaps: true,
    };
    let results = frontier()
        .crawl_site(&format!("{}/", base), &budget)
        .await
        .unwrap();

    assert!(results.iter().any(|r| r.url.ends_with("/hidden-page")));
}

#[tokio::test]
async fn test_max_pages_bounds_the_run() {
    let server = MockServer::start().await;
    let mut home = String::from("<html><body>");
    for i in 0..20 {
        home.push_str(&format!(r#"<a href="/page-{i}">p</a>"#));
    }
    home.push_str("</body></html>");
    mount_page(&server, "/", &home).await;
    for i in 0..20 {
        mount_page(
            &server,
            &format!("/page-{i}"),
            "<html><body>leaf</body></html>",
        )
        .await;
    }

    let budget = CrawlBudget {
        max_pages: 5,
        respect_robots: false,
        include_sitemaps: false,
    };
    let results = frontier()
        .crawl_site(&format!("{}/", server.uri()), &budget)
        .await
        .unwrap();

    assert_eq!(results.len(), 5);
}
