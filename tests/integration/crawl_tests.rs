//! Integration tests for the mirror
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end, writing the mirror into a temporary directory.

use std::fs;
use std::path::Path;
use sumi_mirror::config::{parse_config, Config};
use sumi_mirror::crawler::run_mirror;
use sumi_mirror::ResourceOutcome;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration mirroring `origin` into `root`
fn create_test_config(origin: &str, root: &Path, extra: &str) -> Config {
    parse_config(&format!(
        r#"
origin = "{}"

[crawler]
request-timeout-secs = 5
connect-timeout-secs = 2
{}

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"

[output]
root = '{}'
"#,
        origin,
        extra,
        root.display()
    ))
    .expect("Failed to build test config")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_get(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_mirror_single_origin() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().expect("Failed to create temp dir");

    mount_get(
        &mock_server,
        "/",
        html(&format!(
            r#"<html><head><title>Home</title><link rel="stylesheet" href="/css/site.css"></head><body>
            <a href="{}/page1">Page 1</a>
            <a href="page2?from=home#top">Page 2</a>
            <img src="/img/logo.png" srcset="/img/logo.png 1x, /img/logo@2x.png 2x">
            </body></html>"#,
            base_url
        )),
    )
    .await;
    mount_get(&mock_server, "/page1", html("<html><body>Content 1</body></html>")).await;
    mount_get(&mock_server, "/page2", html(r#"<a href="/">Home</a>"#)).await;
    mount_get(
        &mock_server,
        "/css/site.css",
        ResponseTemplate::new(200).set_body_raw(b"body{}".to_vec(), "text/css"),
    )
    .await;
    mount_get(
        &mock_server,
        "/img/logo.png",
        ResponseTemplate::new(200).set_body_raw(b"\x89PNG1".to_vec(), "image/png"),
    )
    .await;
    mount_get(
        &mock_server,
        "/img/logo@2x.png",
        ResponseTemplate::new(200).set_body_raw(b"\x89PNG2".to_vec(), "image/png"),
    )
    .await;

    let config = create_test_config(&base_url, out.path(), "");
    let stats = run_mirror(&config).await.expect("Mirror failed");

    let root = out.path();
    let index = fs::read_to_string(root.join("index.html")).expect("index.html missing");
    assert!(index.contains(r#"href="/page1/""#));
    assert!(index.contains(r#"href="/page2/#top""#));
    assert!(index.contains(r#"href="/css/site.css""#));
    assert!(index.contains(r#"src="/img/logo.png""#));
    assert!(index.contains(r#"srcset="/img/logo.png 1x, /img/logo@2x.png 2x""#));
    assert!(!index.contains(&base_url));

    assert!(root.join("page1/index.html").exists());
    assert!(root.join("page2/index.html").exists());
    assert_eq!(fs::read(root.join("css/site.css")).unwrap(), b"body{}");
    assert_eq!(fs::read(root.join("img/logo.png")).unwrap(), b"\x89PNG1");
    assert_eq!(fs::read(root.join("img/logo@2x.png")).unwrap(), b"\x89PNG2");

    // /, /sitemap.xml (404), /page1, /page2, three assets
    assert_eq!(stats.pages_fetched, 7);
    assert_eq!(stats.pages_saved(), 3);
    assert_eq!(stats.assets_saved(), 3);
    assert_eq!(stats.count(ResourceOutcome::NonSuccess), 1);
    assert!(stats.finished_at.is_some());
}

#[tokio::test]
async fn test_sitemap_expansion_and_verbatim_save() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().expect("Failed to create temp dir");

    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{}/from-sitemap</loc></url>
  <url><loc>https://other.example/elsewhere</loc></url>
</urlset>"#,
        base_url
    );

    mount_get(&mock_server, "/", html("<html><body>No links</body></html>")).await;
    mount_get(
        &mock_server,
        "/sitemap.xml",
        ResponseTemplate::new(200).set_body_raw(sitemap.clone().into_bytes(), "application/xml"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/from-sitemap"))
        .respond_with(html("<html><body>Listed</body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, out.path(), "");
    let stats = run_mirror(&config).await.expect("Mirror failed");

    let saved = fs::read_to_string(out.path().join("sitemap.xml")).expect("sitemap missing");
    assert_eq!(saved, sitemap);
    assert!(out.path().join("from-sitemap/index.html").exists());

    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.sitemaps_saved(), 1);
}

#[tokio::test]
async fn test_connection_failure_does_not_halt() {
    // Reserve a port, then close it so connections are refused
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local addr").port();
    drop(listener);

    let out = TempDir::new().expect("Failed to create temp dir");
    let config = create_test_config(&format!("http://127.0.0.1:{}", port), out.path(), "");

    let stats = run_mirror(&config).await.expect("Mirror failed");

    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.count(ResourceOutcome::FetchFailed), 2);
    assert_eq!(stats.pages_saved(), 0);
    assert!(stats.finished_at.is_some());
}

#[tokio::test]
async fn test_redirected_page_resolves_against_final_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().expect("Failed to create temp dir");

    mount_get(&mock_server, "/", html(r#"<a href="/old">Old</a>"#)).await;
    mount_get(
        &mock_server,
        "/old",
        ResponseTemplate::new(301).insert_header("location", format!("{}/new/", base_url).as_str()),
    )
    .await;
    mount_get(&mock_server, "/new/", html(r#"<a href="child">Child</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/new/child"))
        .respond_with(html("<p>child</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, out.path(), "");
    run_mirror(&config).await.expect("Mirror failed");

    let old = fs::read_to_string(out.path().join("old/index.html")).expect("old page missing");
    assert!(old.contains(r#"href="/new/child/""#));
    assert!(out.path().join("new/child/index.html").exists());
}

#[tokio::test]
async fn test_budget_limits_fetches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().expect("Failed to create temp dir");

    mount_get(
        &mock_server,
        "/",
        html(r#"<a href="/a">A</a><a href="/b">B</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("<p>a</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, out.path(), "max-pages = 2");
    let stats = run_mirror(&config).await.expect("Mirror failed");

    // / and /sitemap.xml use up the budget
    assert_eq!(stats.pages_fetched, 2);
    assert!(stats.urls_remaining >= 2);
    assert!(out.path().join("index.html").exists());
}
