//! Integration tests for the mirror crawler
//!
//! These tests use wiremock to serve a small site and verify the full
//! mirror cycle end-to-end: admission, traversal order, rewriting, and
//! the on-disk tree.

use std::cell::RefCell;
use std::rc::Rc;

use sitefold::{CrawlerOptions, Hooks, ProcessOutcome, WebsiteCrawler};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_response(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/html; charset=utf-8")
}

fn css_response(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.into())
        .insert_header("content-type", "text/css")
}

fn png_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png")
}

async fn mount_page(server: &MockServer, route: &str, body: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_response(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn mount_png(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(png_response())
        .expect(1)
        .mount(server)
        .await;
}

fn writer_options(output: &TempDir) -> CrawlerOptions {
    CrawlerOptions {
        output_dir: Some(output.path().to_path_buf()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_mirrors_a_small_site() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/about">About</a>
            <a href="/gallery/">Gallery</a>
            <link rel="stylesheet" href="/assets/style.css">
            <img src="logo.png">
        </body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(
        &server,
        "/about",
        "<html><body>About us</body></html>".to_string(),
        1,
    )
    .await;
    mount_page(
        &server,
        "/gallery/",
        r#"<html><body><img srcset="a.png 1x, b.png 2x"></body></html>"#.to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/assets/style.css"))
        .respond_with(css_response("body { background: url(../img/bg.png); }"))
        .expect(1)
        .mount(&server)
        .await;
    mount_png(&server, "/logo.png").await;
    mount_png(&server, "/img/bg.png").await;
    mount_png(&server, "/gallery/a.png").await;
    mount_png(&server, "/gallery/b.png").await;

    let mut crawler = WebsiteCrawler::new(&server.uri(), writer_options(&output)).unwrap();
    let report = crawler.start(None).await.unwrap().clone();

    assert_eq!(report.pages_downloaded, 3);
    assert_eq!(report.resources_downloaded, 5);
    assert_eq!(report.failures, 0);

    let root = output.path().join("localhost");
    for file in [
        "index.html",
        "about/index.html",
        "gallery/index.html",
        "assets/style.css",
        "logo.png",
        "img/bg.png",
        "gallery/a.png",
        "gallery/b.png",
    ] {
        assert!(root.join(file).is_file(), "missing {}", file);
    }

    // Root page references stay flat; the stylesheet body is untouched.
    let index = std::fs::read_to_string(root.join("index.html")).unwrap();
    assert!(index.contains(r#"href="about/index.html""#), "{}", index);
    assert!(index.contains(r#"href="assets/style.css""#), "{}", index);
    assert!(index.contains(r#"src="logo.png""#), "{}", index);

    let css = std::fs::read_to_string(root.join("assets/style.css")).unwrap();
    assert_eq!(css, "body { background: url(../img/bg.png); }");

    // A nested page climbs out of its own directory.
    let gallery = std::fs::read_to_string(root.join("gallery/index.html")).unwrap();
    assert!(
        gallery.contains(r#"srcset="../gallery/a.png 1x,../gallery/b.png 2x""#),
        "{}",
        gallery
    );
}

#[tokio::test]
async fn test_redirect_target_is_admitted_and_mirrored() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/old">Old</a></body></html>"#.to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/new",
        "<html><body>Moved here</body></html>".to_string(),
        1,
    )
    .await;

    let mut crawler = WebsiteCrawler::new(&server.uri(), writer_options(&output)).unwrap();
    let report = crawler.start(None).await.unwrap().clone();

    assert_eq!(report.redirects, 1);
    assert!(output.path().join("localhost/new/index.html").is_file());
    assert!(!output.path().join("localhost/old/index.html").exists());
}

#[tokio::test]
async fn test_forbidden_prefix_is_rewritten_but_never_fetched() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body>
            <a href="/wp-json/users">API</a>
            <a href="/about">About</a>
        </body></html>"#
            .to_string(),
        1,
    )
    .await;
    mount_page(
        &server,
        "/about",
        "<html><body>About</body></html>".to_string(),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/users"))
        .respond_with(html_response("should never be requested"))
        .expect(0)
        .mount(&server)
        .await;

    let mut options = writer_options(&output);
    options.forbidden_urls = vec!["/wp-json".to_string()];
    let mut crawler = WebsiteCrawler::new(&server.uri(), options).unwrap();
    crawler.start(None).await.unwrap();

    let index =
        std::fs::read_to_string(output.path().join("localhost/index.html")).unwrap();
    assert!(
        index.contains(r#"href="wp-json/users/index.html""#),
        "{}",
        index
    );
    assert!(!output.path().join("localhost/wp-json").exists());
}

#[tokio::test]
async fn test_foreign_origin_links_fold_into_the_mirror() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        format!(
            r#"<html><body><a href="{}/bar">Bar</a></body></html>"#,
            server.uri()
        ),
        1,
    )
    .await;
    mount_page(&server, "/bar", "<html><body>Bar</body></html>".to_string(), 1).await;

    let mut options = writer_options(&output);
    options.new_website_url = Some("https://mirror.local".to_string());
    let mut crawler = WebsiteCrawler::new(&server.uri(), options).unwrap();
    crawler.start(None).await.unwrap();

    let index =
        std::fs::read_to_string(output.path().join("localhost/index.html")).unwrap();
    assert!(index.contains(r#"href="bar/index.html""#), "{}", index);
    assert!(output.path().join("localhost/bar/index.html").is_file());
}

#[tokio::test]
async fn test_page_hook_halts_the_traversal() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/a">A</a><a href="/b">B</a></body></html>"#.to_string(),
        1,
    )
    .await;
    for route in ["/a", "/b"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(html_response("unreached"))
            .expect(0)
            .mount(&server)
            .await;
    }

    let outcomes = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&outcomes);

    let mut options = writer_options(&output);
    options.hooks = Hooks {
        on_page_fully_downloaded: Some(Box::new(move |url, outcome| {
            seen.borrow_mut().push((url.to_string(), outcome));
            false
        })),
        ..Default::default()
    };

    let mut crawler = WebsiteCrawler::new(&server.uri(), options).unwrap();
    crawler.start(None).await.unwrap();

    let outcomes = outcomes.borrow();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].1, ProcessOutcome::Downloaded);
}

#[tokio::test]
async fn test_already_mirrored_page_can_be_skipped() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response("should never be requested"))
        .expect(0)
        .mount(&server)
        .await;

    // Pre-seed the mirror with a previous run's root page.
    let root = output.path().join("localhost");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("index.html"), "<html>cached</html>").unwrap();

    let mut options = writer_options(&output);
    options.hooks = Hooks {
        can_ignore_if_already_crawled: Some(Box::new(|_, hit| {
            assert!(hit.file_path.ends_with("localhost/index.html"));
            true
        })),
        ..Default::default()
    };

    let mut crawler = WebsiteCrawler::new(&server.uri(), options).unwrap();
    let report = crawler.start(None).await.unwrap().clone();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.pages_downloaded, 0);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    // First attempt fails, the retry succeeds. The first retry is
    // immediate, so this test does not sleep.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", "<html><body>Recovered</body></html>".to_string(), 1).await;

    let mut crawler = WebsiteCrawler::new(&server.uri(), writer_options(&output)).unwrap();
    let report = crawler.start(None).await.unwrap().clone();

    assert_eq!(report.pages_downloaded, 1);
    assert_eq!(report.failures, 0);
    assert!(output.path().join("localhost/index.html").is_file());
}

#[tokio::test]
async fn test_retry_hook_overrides_the_default_policy() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let mut options = writer_options(&output);
    options.hooks = Hooks {
        on_invalid_response_code_found: Some(Box::new(|_, _, status| {
            assert_eq!(status, 503);
            false
        })),
        ..Default::default()
    };

    let mut crawler = WebsiteCrawler::new(&server.uri(), options).unwrap();
    let report = crawler.start(None).await.unwrap().clone();

    assert_eq!(report.failures, 1);
    assert_eq!(report.pages_downloaded, 0);
}

#[tokio::test]
async fn test_can_download_drops_urls_from_the_drain() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/keep">K</a><a href="/drop">D</a></body></html>"#.to_string(),
        1,
    )
    .await;
    mount_page(&server, "/keep", "<html><body>kept</body></html>".to_string(), 1).await;
    Mock::given(method("GET"))
        .and(path("/drop"))
        .respond_with(html_response("unreached"))
        .expect(0)
        .mount(&server)
        .await;

    let mut options = writer_options(&output);
    options.hooks = Hooks {
        can_download: Some(Box::new(|url, is_resource| {
            assert!(!is_resource);
            !url.ends_with("/drop")
        })),
        ..Default::default()
    };

    let mut crawler = WebsiteCrawler::new(&server.uri(), options).unwrap();
    crawler.start(None).await.unwrap();

    assert!(output.path().join("localhost/keep/index.html").is_file());
    assert!(!output.path().join("localhost/drop").exists());
}

#[tokio::test]
async fn test_sort_hook_reorders_pending_pages() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(
        &server,
        "/",
        r#"<html><body><a href="/b">B</a><a href="/a">A</a></body></html>"#.to_string(),
        1,
    )
    .await;
    mount_page(&server, "/a", "<html><body>a</body></html>".to_string(), 1).await;
    mount_page(&server, "/b", "<html><body>b</body></html>".to_string(), 1).await;

    let visited = Rc::new(RefCell::new(Vec::new()));
    let order = Rc::clone(&visited);

    let mut options = writer_options(&output);
    options.hooks = Hooks {
        sort_pages_to_download: Some(Box::new(|tools| tools.sort_ascending())),
        on_url: Some(Box::new(move |local_url, _| {
            order.borrow_mut().push(local_url.to_string());
        })),
        ..Default::default()
    };

    let mut crawler = WebsiteCrawler::new(&server.uri(), options).unwrap();
    crawler.start(None).await.unwrap();

    assert_eq!(*visited.borrow(), ["", "/a", "/b"]);
}

#[tokio::test]
async fn test_scan_urls_join_the_initial_group() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&server, "/", "<html><body>root</body></html>".to_string(), 1).await;
    mount_page(
        &server,
        "/hidden",
        "<html><body>unlinked page</body></html>".to_string(),
        1,
    )
    .await;

    let mut options = writer_options(&output);
    options.scan_this_urls = vec!["/hidden".to_string()];

    let mut crawler = WebsiteCrawler::new(&server.uri(), options).unwrap();
    crawler.start(None).await.unwrap();

    assert!(output.path().join("localhost/hidden/index.html").is_file());
}

#[tokio::test]
async fn test_second_start_is_a_no_op() {
    let server = MockServer::start().await;
    let output = TempDir::new().unwrap();

    mount_page(&server, "/", "<html><body>once</body></html>".to_string(), 1).await;

    let mut crawler = WebsiteCrawler::new(&server.uri(), writer_options(&output)).unwrap();
    crawler.start(None).await.unwrap();
    let report = crawler.start(None).await.unwrap().clone();

    assert_eq!(report.pages_downloaded, 1);
}
