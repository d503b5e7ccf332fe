//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use sitemapper::config::{Config, OutputFormat};
use sitemapper::crawler::{run_crawl, CrawlOutcome};
use sitemapper::StopReason;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Slack for timer and scheduling jitter when comparing arrival gaps
const ARRIVAL_JITTER: Duration = Duration::from_millis(50);

type Arrivals = Arc<Mutex<Vec<(String, Instant)>>>;

/// Creates a test configuration writing everything into `dir`
fn create_test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.request_timeout = 5;
    config.crawler.connect_timeout = 2;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.user_agent.crawler_version = "1.0.0".to_string();
    config.output.directory = dir.join("out");
    config.output.robots_directory = dir.join("robots");
    config
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_robots(server: &MockServer, content: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(content))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html_page(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Serves an HTML page and notes when each request for it arrived
struct RecordingPage {
    body: String,
    arrivals: Arrivals,
}

impl Respond for RecordingPage {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        self.arrivals
            .lock()
            .unwrap()
            .push((request.url.path().to_string(), Instant::now()));
        html_page(&self.body)
    }
}

async fn mount_recorded_page(server: &MockServer, page: &str, body: &str, arrivals: &Arrivals) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(RecordingPage {
            body: body.to_string(),
            arrivals: Arc::clone(arrivals),
        })
        .expect(1)
        .mount(server)
        .await;
}

/// Asserts consecutive page requests arrived at least `delay` apart
fn assert_gaps_at_least(arrivals: &Arrivals, delay: Duration) {
    let arrivals = arrivals.lock().unwrap();
    for pair in arrivals.windows(2) {
        let gap = pair[1].1.duration_since(pair[0].1);
        assert!(
            gap + ARRIVAL_JITTER >= delay,
            "{} arrived {:?} after {}",
            pair[1].0,
            gap,
            pair[0].0
        );
    }
}

/// Replaces the persisted robots copy with a directory before answering
struct SpoilRobotsCopy {
    copy: PathBuf,
}

impl Respond for SpoilRobotsCopy {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        std::fs::remove_file(&self.copy).unwrap();
        std::fs::create_dir(&self.copy).unwrap();
        html_page(r#"<a href="/late">Late</a>"#)
    }
}

async fn mount_unvisited(server: &MockServer, page: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html_page("unreachable"))
        .expect(0)
        .mount(server)
        .await;
}

fn site(server: &MockServer) -> Url {
    Url::parse(&server.uri()).unwrap()
}

/// `127.0.0.1_{port}`, the file stem used for the server's artifacts
fn file_stem(server: &MockServer) -> String {
    let url = site(server);
    format!("{}_{}", url.host_str().unwrap(), url.port().unwrap())
}

async fn crawl(server: &MockServer, config: Config) -> CrawlOutcome {
    run_crawl(config, site(server), CancellationToken::new())
        .await
        .expect("crawl should succeed")
}

fn locations(outcome: &CrawlOutcome) -> Vec<String> {
    outcome
        .report
        .records
        .iter()
        .map(|r| r.location().to_string())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_respects_robots_and_delay() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    let arrivals = Arrivals::default();

    mount_robots(&server, "User-agent: *\nDisallow: /admin\nCrawl-delay: 1\n").await;
    mount_recorded_page(
        &server,
        "/",
        r#"<a href="/page1">One</a>
           <a href="/page2">Two</a>
           <a href="/admin">Admin</a>
           <link rel="stylesheet" href="/style.css">
           <script src="/app.js"></script>"#,
        &arrivals,
    )
    .await;
    mount_recorded_page(
        &server,
        "/page1/",
        r#"<a href="/">Home</a><a href="/page2">Two</a><img src="/logo.png">"#,
        &arrivals,
    )
    .await;
    mount_recorded_page(
        &server,
        "/page2/",
        r#"<a href="http://other.test/">Elsewhere</a>"#,
        &arrivals,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/admin/"))
        .respond_with(html_page("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let start = Instant::now();
    let outcome = crawl(&server, create_test_config(dir.path())).await;
    let elapsed = start.elapsed();

    assert_eq!(outcome.report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(
        locations(&outcome),
        vec![
            format!("{}/", base),
            format!("{}/page1/", base),
            format!("{}/page2/", base),
        ]
    );

    let home = &outcome.report.records[0];
    assert_eq!(
        home.links(),
        &[
            format!("{}/page1/", base),
            format!("{}/page2/", base),
            format!("{}/admin/", base),
        ]
    );
    assert_eq!(home.stylesheets(), &["/style.css".to_string()]);
    assert_eq!(home.scripts(), &["/app.js".to_string()]);
    assert_eq!(outcome.report.records[1].images(), &["/logo.png".to_string()]);
    assert!(outcome.report.records[2].links().is_empty());

    // Three fetches one second apart
    assert!(elapsed >= Duration::from_secs(2), "elapsed {:?}", elapsed);
    assert_eq!(arrivals.lock().unwrap().len(), 3);
    assert_gaps_at_least(&arrivals, Duration::from_secs(1));

    let stats = &outcome.report.statistics;
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.pages_failed, 0);
    assert_eq!(stats.pages_skipped, 1);
    assert_eq!(stats.urls_discovered, 4);

    let stem = file_stem(&server);
    assert_eq!(
        outcome.sitemap_path,
        dir.path().join("out").join(format!("{}.json", stem))
    );
    assert!(dir.path().join("robots").join(&stem).exists());
    assert!(outcome.summary_path.is_none());

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&outcome.sitemap_path).unwrap()).unwrap();
    let entries = written.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["Location"], format!("{}/", base));
    assert_eq!(entries[2]["Urls"], serde_json::json!([]));
    assert_eq!(entries[2]["Stylesheets"], serde_json::json!([]));
}

#[tokio::test]
async fn test_crawl_delay_between_fetch_starts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let arrivals = Arrivals::default();

    mount_robots(&server, "User-agent: *\nCrawl-delay: 2\n").await;
    mount_recorded_page(&server, "/", r#"<a href="/next">Next</a>"#, &arrivals).await;
    mount_recorded_page(&server, "/next/", "", &arrivals).await;

    let start = Instant::now();
    let outcome = crawl(&server, create_test_config(dir.path())).await;

    assert_eq!(outcome.report.records.len(), 2);
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert_eq!(arrivals.lock().unwrap().len(), 2);
    assert_gaps_at_least(&arrivals, Duration::from_secs(2));
}

#[tokio::test]
async fn test_disallowed_urls_consume_no_delay() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let arrivals = Arrivals::default();

    mount_robots(&server, "User-agent: *\nDisallow: /private\nCrawl-delay: 2\n").await;
    mount_recorded_page(
        &server,
        "/",
        r#"<a href="/private-a">A</a>
           <a href="/private-b">B</a>
           <a href="/private-c">C</a>
           <a href="/public">Public</a>"#,
        &arrivals,
    )
    .await;
    mount_recorded_page(&server, "/public/", "", &arrivals).await;

    let start = Instant::now();
    let outcome = crawl(&server, create_test_config(dir.path())).await;
    let elapsed = start.elapsed();

    assert_eq!(outcome.report.records.len(), 2);
    assert_eq!(outcome.report.statistics.pages_skipped, 3);
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(4), "elapsed {:?}", elapsed);

    // Only the two fetched pages waited on each other
    let recorded = arrivals.lock().unwrap().clone();
    assert_eq!(recorded.len(), 2);
    let gap = recorded[1].1.duration_since(recorded[0].1);
    assert!(gap + ARRIVAL_JITTER >= Duration::from_secs(2), "gap {:?}", gap);
    assert!(gap < Duration::from_secs(3), "gap {:?}", gap);
}

#[tokio::test]
async fn test_failed_pages_yield_empty_records() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_robots(&server, "User-agent: *\nCrawl-delay: 0\n").await;
    mount_page(
        &server,
        "/",
        r#"<a href="/broken">Broken</a><a href="/garbled">Garbled</a><a href="/fine">Fine</a>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/broken/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/garbled/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<<<%%% this is not </html", "text/html"))
        .expect(1)
        .mount(&server)
        .await;

    mount_page(&server, "/fine/", r#"<img src="//cdn.test/pic.png">"#).await;

    let outcome = crawl(&server, create_test_config(dir.path())).await;

    assert_eq!(outcome.report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(outcome.report.records.len(), 4);

    let broken = &outcome.report.records[1];
    assert_eq!(broken.location(), format!("{}/broken/", base));
    assert!(broken.is_empty());

    assert!(outcome.report.records[2].is_empty());
    assert_eq!(
        outcome.report.records[3].images(),
        &["http://cdn.test/pic.png".to_string()]
    );

    assert_eq!(outcome.report.statistics.pages_fetched, 4);
    assert_eq!(outcome.report.statistics.pages_failed, 1);
}

#[tokio::test]
async fn test_non_html_pages_are_not_parsed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_robots(&server, "User-agent: *\nCrawl-delay: 0\n").await;
    mount_page(&server, "/", r#"<a href="/data">Data</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/data/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"html": "<a href=\"/hidden\">x</a>"}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = crawl(&server, create_test_config(dir.path())).await;

    assert_eq!(outcome.report.records.len(), 2);
    assert!(outcome.report.records[1].is_empty());
    assert_eq!(outcome.report.statistics.pages_failed, 1);
}

#[tokio::test]
async fn test_missing_robots_means_unrestricted() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // No robots.txt mock: wiremock answers 404
    mount_page(&server, "/", r#"<a href="/admin">Admin</a>"#).await;
    mount_page(&server, "/admin/", "").await;

    let outcome = crawl(&server, create_test_config(dir.path())).await;

    assert_eq!(outcome.report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(outcome.report.records.len(), 2);
    assert!(!dir.path().join("robots").join(file_stem(&server)).exists());
}

#[tokio::test]
async fn test_robots_without_wildcard_group_stops_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_robots(&server, "User-agent: googlebot\nDisallow: /\n").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(""))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = crawl(&server, create_test_config(dir.path())).await;

    assert_eq!(outcome.report.stop_reason, StopReason::RobotsExcluded);
    assert!(outcome.report.records.is_empty());

    let written = std::fs::read_to_string(&outcome.sitemap_path).unwrap();
    assert_eq!(written.trim(), "[]");
}

#[tokio::test]
async fn test_cancelled_crawl_still_writes_sitemap() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_robots(&server, "User-agent: *\n").await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(""))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = run_crawl(create_test_config(dir.path()), site(&server), cancel)
        .await
        .unwrap();

    assert_eq!(outcome.report.stop_reason, StopReason::Cancelled);
    assert!(outcome.report.records.is_empty());
    assert!(outcome.sitemap_path.exists());
}

#[tokio::test]
async fn test_cancel_during_delay_keeps_partial_results() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_robots(&server, "User-agent: *\nCrawl-delay: 30\n").await;
    mount_page(&server, "/", r#"<a href="/later">Later</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/later/"))
        .respond_with(html_page(""))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let outcome = run_crawl(create_test_config(dir.path()), site(&server), cancel)
        .await
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(outcome.report.stop_reason, StopReason::Cancelled);
    assert_eq!(outcome.report.records.len(), 1);
}

#[tokio::test]
async fn test_map_output_and_summary() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_robots(&server, "User-agent: *\nCrawl-delay: 0\n").await;
    mount_page(&server, "/", r#"<a href="/b">B</a>"#).await;
    mount_page(&server, "/b/", "").await;

    let mut config = create_test_config(dir.path());
    config.output.format = OutputFormat::Map;
    config.output.summary = true;

    let outcome = crawl(&server, config).await;

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&outcome.sitemap_path).unwrap()).unwrap();
    let map = written.as_object().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(
        map[&format!("{}/", base)]["Urls"],
        serde_json::json!([format!("{}/b/", base)])
    );

    let summary_path = outcome.summary_path.unwrap();
    assert_eq!(
        summary_path,
        dir.path().join("out").join(format!("{}.md", file_stem(&server)))
    );
    let summary = std::fs::read_to_string(summary_path).unwrap();
    assert!(summary.contains("frontier exhausted"));
}

#[tokio::test]
async fn test_mixed_case_disallow_blocks_lowercased_links() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_robots(&server, "User-agent: *\nDisallow: /Admin\nCrawl-delay: 0\n").await;
    mount_page(
        &server,
        "/",
        r#"<a href="/Admin/Panel">Panel</a><a href="/about">About</a>"#,
    )
    .await;
    mount_page(&server, "/about/", "").await;
    mount_unvisited(&server, "/admin/panel/").await;

    let outcome = crawl(&server, create_test_config(dir.path())).await;

    assert_eq!(outcome.report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(
        locations(&outcome),
        vec![format!("{}/", base), format!("{}/about/", base)]
    );
    assert_eq!(outcome.report.statistics.pages_skipped, 1);
}

#[tokio::test]
async fn test_seed_query_and_fragment_are_dropped() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();

    mount_robots(&server, "User-agent: *\nCrawl-delay: 0\n").await;
    mount_page(&server, "/", "").await;

    let seed = Url::parse(&format!("{}/?x=1#top", base)).unwrap();
    let outcome = run_crawl(create_test_config(dir.path()), seed, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(locations(&outcome), vec![format!("{}/", base)]);

    let requests = server.received_requests().await.unwrap();
    let home = requests
        .iter()
        .find(|r| r.url.path() == "/")
        .expect("home page requested");
    assert_eq!(home.url.query(), None);
}

#[tokio::test]
async fn test_stale_rules_are_reloaded_mid_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.crawler.robots_max_age = 1;

    // The first rules go stale while the crawl waits on the delay
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 2\n"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /late\nCrawl-delay: 0\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    mount_page(&server, "/", r#"<a href="/next">Next</a>"#).await;
    mount_page(&server, "/next/", r#"<a href="/late">Late</a>"#).await;
    mount_unvisited(&server, "/late/").await;

    let outcome = crawl(&server, config).await;

    assert_eq!(outcome.report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(
        locations(&outcome),
        vec![format!("{}/", base), format!("{}/next/", base)]
    );
    assert_eq!(outcome.report.statistics.pages_skipped, 1);

    let copy = dir.path().join("robots").join(file_stem(&server));
    assert!(std::fs::read_to_string(copy).unwrap().contains("Disallow: /late"));
}

#[tokio::test]
async fn test_refreshed_rules_without_wildcard_group_stop_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.crawler.robots_max_age = 1;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 2\n"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: googlebot\nDisallow: /\n"))
        .expect(1)
        .mount(&server)
        .await;

    mount_page(&server, "/", r#"<a href="/next">Next</a>"#).await;
    mount_page(&server, "/next/", r#"<a href="/late">Late</a>"#).await;
    mount_unvisited(&server, "/late/").await;

    let outcome = crawl(&server, config).await;

    assert_eq!(outcome.report.stop_reason, StopReason::RobotsExcluded);
    assert!(!outcome.report.stop_reason.is_failure());
    assert_eq!(
        locations(&outcome),
        vec![format!("{}/", base), format!("{}/next/", base)]
    );

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&outcome.sitemap_path).unwrap()).unwrap();
    assert_eq!(written.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_unreadable_robots_copy_aborts_with_partial_records() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.crawler.robots_max_age = 1;

    mount_robots(&server, "User-agent: *\nCrawl-delay: 2\n").await;
    mount_page(&server, "/", r#"<a href="/next">Next</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/next/"))
        .respond_with(SpoilRobotsCopy {
            copy: dir.path().join("robots").join(file_stem(&server)),
        })
        .expect(1)
        .mount(&server)
        .await;
    mount_unvisited(&server, "/late/").await;

    let outcome = crawl(&server, config).await;

    assert!(
        matches!(outcome.report.stop_reason, StopReason::Aborted { .. }),
        "stopped with {:?}",
        outcome.report.stop_reason
    );
    assert!(outcome.report.stop_reason.is_failure());
    assert_eq!(
        locations(&outcome),
        vec![format!("{}/", base), format!("{}/next/", base)]
    );
    assert_eq!(
        outcome.report.records[1].links(),
        &[format!("{}/late/", base)]
    );

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&outcome.sitemap_path).unwrap()).unwrap();
    let entries = written.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["Location"], format!("{}/next/", base));
}

#[tokio::test]
async fn test_page_timeout_yields_empty_record_and_crawl_continues() {
    let server = MockServer::start().await;
    let base = server.uri();
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(dir.path());
    config.crawler.request_timeout = 1;

    mount_robots(&server, "User-agent: *\nCrawl-delay: 0\n").await;
    mount_page(
        &server,
        "/",
        r#"<a href="/slow">Slow</a><a href="/fine">Fine</a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/slow/"))
        .respond_with(html_page(r#"<a href="/hidden">Hidden</a>"#).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    mount_page(&server, "/fine/", "").await;
    mount_unvisited(&server, "/hidden/").await;

    let outcome = crawl(&server, config).await;

    assert_eq!(outcome.report.stop_reason, StopReason::FrontierExhausted);
    assert_eq!(
        locations(&outcome),
        vec![
            format!("{}/", base),
            format!("{}/slow/", base),
            format!("{}/fine/", base),
        ]
    );

    let slow = &outcome.report.records[1];
    assert!(slow.links().is_empty());
    assert!(slow.stylesheets().is_empty());
    assert!(slow.scripts().is_empty());
    assert!(slow.images().is_empty());

    let stats = &outcome.report.statistics;
    assert_eq!(stats.pages_fetched, 3);
    assert_eq!(stats.pages_failed, 1);
}
