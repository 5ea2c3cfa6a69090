//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a small listing site and run the full
//! harvest cycle over real HTTP, end to end.

use listing_harvester::config::{parse_config, Config};
use listing_harvester::crawler::{Harvester, HttpFetcher, StopReason};
use listing_harvester::output::{export, CsvSink, RowSink, SqliteSink, XlsxSink};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
///
/// Delays are zero so the tests run fast; robots.txt is honoured.
fn create_test_config(base_url: &str, extra_crawler: &str) -> Config {
    let toml = format!(
        r#"
[site]
base-url = "{base_url}"
listing-path = "/startup.html"

[crawler]
retry-count = 3
retry-base-delay-ms = 0
retry-increment-ms = 0
politeness-delay-min-ms = 0
politeness-delay-max-ms = 0
request-timeout-secs = 5
{extra_crawler}

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
csv-path = "unused.csv"
"#
    );
    parse_config(&toml).expect("test config should parse")
}

fn card(title: &str, href: &str) -> String {
    format!(
        r#"<div class="startup-block"><a class="card" href="{href}">
            <img class="card-img-top" src="/uploads/{title}.png">
            <div class="card-body">
              <h5 class="card-title">{title}</h5>
              <p class="card-text">Short text about {title}</p>
            </div></a></div>"#
    )
}

fn listing_page(cards: &[String], next: Option<&str>) -> String {
    let next = next
        .map(|n| format!(r#"<li class="page-item"><a class="page-link" href="{n}">»</a></li>"#))
        .unwrap_or_else(|| r##"<li class="page-item disabled"><a class="page-link" href="#">»</a></li>"##.to_string());
    format!(
        r#"<html><body><div class="container">{}</div>
        <ul class="pagination">{next}</ul></body></html>"#,
        cards.concat()
    )
}

fn detail_page(title: &str, segment: &str, email: &str) -> String {
    format!(
        r#"<html><body><article class="post">
            <h1>{title}</h1>
            <div class="process-step-content"><h4>Seqment</h4><p>{segment}</p></div>
            <div class="process-step-content"><h4>Vebsayt</h4><p>https://{title}.az</p></div>
            <p>{title} helps small merchants accept card payments online.</p>
            <img src="/uploads/{title}-team.jpg">
          </article>
          <footer>Contact: {email}</footer></body></html>"#
    )
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_listing(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path("/startup.html"))
        .and(query_param("page", page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, slug: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/startup-content/{}", slug)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_follow_next() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_listing(
        &mock_server,
        "1",
        listing_page(
            &[card("acme", "/startup-content/acme"), card("beta", "/startup-content/beta")],
            Some("/startup.html?page=2"),
        ),
    )
    .await;
    mount_listing(
        &mock_server,
        "2",
        listing_page(&[card("gamma", "/startup-content/gamma")], None),
    )
    .await;
    mount_detail(&mock_server, "acme", detail_page("acme", "FinTech", "hi@acme.az")).await;
    mount_detail(&mock_server, "beta", detail_page("beta", "EdTech", "team@beta.az")).await;
    mount_detail(&mock_server, "gamma", detail_page("gamma", "AgriTech", "gamma@mail.az")).await;

    let config = create_test_config(&base_url, "");
    let fetcher = HttpFetcher::new(&config).expect("Failed to build fetcher");
    let harvester = Harvester::new(config, fetcher).expect("Failed to build harvester");
    let outcome = harvester.run().await.expect("Harvest failed");

    assert_eq!(outcome.report.listing_pages_crawled, 2);
    assert_eq!(outcome.report.details_fetched, 3);
    assert_eq!(outcome.report.stop_reason, Some(StopReason::NoNextLink));
    assert_eq!(outcome.rows.len(), 3);

    let acme = &outcome.rows[0];
    assert_eq!(acme.get("Title"), Some("acme"));
    assert_eq!(acme.get("listing_title"), Some("acme"));
    assert_eq!(acme.get("short_description"), Some("Short text about acme"));
    assert_eq!(acme.get("Segment"), Some("FinTech"));
    assert_eq!(acme.get("Website"), Some("https://acme.az"));
    assert_eq!(acme.get("Email"), Some("hi@acme.az"));
    assert_eq!(
        acme.get("Description"),
        Some("acme helps small merchants accept card payments online.")
    );
    assert_eq!(
        acme.get("listing_image"),
        Some(format!("{}/uploads/acme.png", base_url).as_str())
    );
    assert_eq!(
        acme.get("Images"),
        Some(format!("{}/uploads/acme-team.jpg", base_url).as_str())
    );
    assert_eq!(
        acme.get("detail_url"),
        Some(format!("{}/startup-content/acme", base_url).as_str())
    );

    assert_eq!(outcome.rows[2].get("Segment"), Some("AgriTech"));
}

#[tokio::test]
async fn test_csv_xlsx_and_sqlite_export() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_listing(
        &mock_server,
        "1",
        listing_page(&[card("acme", "/startup-content/acme")], None),
    )
    .await;
    mount_detail(&mock_server, "acme", detail_page("acme", "FinTech", "hi@acme.az")).await;

    let config = create_test_config(&base_url, "");
    let harvester = Harvester::new(config.clone(), HttpFetcher::new(&config).unwrap()).unwrap();
    let outcome = harvester.run().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("startups.csv");
    let db_path = dir.path().join("startups.db");
    let xlsx_path = dir.path().join("startups.xlsx");
    let mut sinks: Vec<Box<dyn RowSink>> = vec![
        Box::new(CsvSink::new(&csv_path)),
        Box::new(XlsxSink::new(&xlsx_path)),
        Box::new(SqliteSink::new(&db_path, "test-hash")),
    ];
    let columns = export(&mut sinks, &outcome.rows, &outcome.report).unwrap();

    assert_eq!(
        &columns[..7],
        &["Title", "listing_title", "short_description", "Description", "listing_image", "Images", "detail_url"]
    );

    let bytes = std::fs::read(&csv_path).unwrap();
    assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
    let header = text.lines().next().unwrap();
    assert!(header.starts_with("Title,listing_title,short_description,Description"));
    assert!(header.contains("Segment"));
    assert_eq!(text.lines().count(), 2);

    assert!(std::fs::read(&xlsx_path).unwrap().starts_with(b"PK"));

    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let rows: i64 = conn
        .query_row("SELECT row_count FROM runs ORDER BY id DESC LIMIT 1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_transient_error_is_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(
        &mock_server,
        "1",
        listing_page(&[card("acme", "/startup-content/acme")], None),
    )
    .await;

    // First request fails, the retry succeeds
    Mock::given(method("GET"))
        .and(path("/startup-content/acme"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_detail(&mock_server, "acme", detail_page("acme", "FinTech", "hi@acme.az")).await;

    let config = create_test_config(&base_url, "respect-robots-txt = false");
    let harvester = Harvester::new(config.clone(), HttpFetcher::new(&config).unwrap()).unwrap();
    let outcome = harvester.run().await.unwrap();

    assert_eq!(outcome.report.details_fetched, 1);
    assert_eq!(outcome.report.details_failed, 0);
    assert_eq!(outcome.rows[0].get("Segment"), Some("FinTech"));
}

#[tokio::test]
async fn test_not_found_detail_is_not_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(
        &mock_server,
        "1",
        listing_page(&[card("ghost", "/startup-content/ghost")], None),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/startup-content/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, "respect-robots-txt = false");
    let harvester = Harvester::new(config.clone(), HttpFetcher::new(&config).unwrap()).unwrap();
    let outcome = harvester.run().await.unwrap();

    assert_eq!(outcome.report.details_failed, 1);
    assert_eq!(outcome.rows.len(), 1);
    let row = &outcome.rows[0];
    assert_eq!(row.get("Title"), Some("ghost"));
    assert!(!row.contains("Segment"));
}

#[tokio::test]
async fn test_robots_txt_respect() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nDisallow: /startup-content/secret").await;
    mount_listing(
        &mock_server,
        "1",
        listing_page(
            &[card("acme", "/startup-content/acme"), card("secret", "/startup-content/secret")],
            None,
        ),
    )
    .await;
    mount_detail(&mock_server, "acme", detail_page("acme", "FinTech", "hi@acme.az")).await;
    Mock::given(method("GET"))
        .and(path("/startup-content/secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>secret</h1>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, "");
    let harvester = Harvester::new(config.clone(), HttpFetcher::new(&config).unwrap()).unwrap();
    let outcome = harvester.run().await.unwrap();

    assert_eq!(outcome.rows.len(), 2);
    assert_eq!(outcome.report.details_blocked, 1);
    assert_eq!(outcome.rows[1].get("listing_title"), Some("secret"));
}

#[tokio::test]
async fn test_declared_charset_detail_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(
        &mock_server,
        "1",
        listing_page(&[card("rus", "/startup-content/rus")], None),
    )
    .await;

    let html = r#"<html><head><meta charset="windows-1251"></head><body>
        <h1>Привет</h1>
        <div class="process-step-content"><h4>Сегмент</h4><p>Финтех</p></div>
        </body></html>"#;
    let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(html);
    Mock::given(method("GET"))
        .and(path("/startup-content/rus"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(bytes.into_owned())
                .insert_header("content-type", "text/html; charset=windows-1251"),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, "respect-robots-txt = false");
    let harvester = Harvester::new(config.clone(), HttpFetcher::new(&config).unwrap()).unwrap();
    let outcome = harvester.run().await.unwrap();

    let row = &outcome.rows[0];
    assert_eq!(row.get("Title"), Some("Привет"));
    assert_eq!(row.get("Сегмент"), Some("Финтех"));
}

#[tokio::test]
async fn test_undeclared_charset_is_inferred() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_listing(
        &mock_server,
        "1",
        listing_page(&[card("rus", "/startup-content/rus")], None),
    )
    .await;

    // No charset in the header and no meta tag: only the bytes tell
    let html = r#"<html><head><title>Стартап</title></head><body><article class="post">
        <h1>Привет</h1>
        <div class="process-step-content"><h4>Сегмент</h4><p>Финтех</p></div>
        <div class="process-step-content"><h4>Город</h4><p>Баку</p></div>
        <p>Компания помогает малому бизнесу принимать платежи по картам через интернет и вести учёт продаж.</p>
        </article></body></html>"#;
    let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode(html);
    assert!(std::str::from_utf8(&bytes).is_err());
    Mock::given(method("GET"))
        .and(path("/startup-content/rus"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(bytes.into_owned())
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, "respect-robots-txt = false");
    let harvester = Harvester::new(config.clone(), HttpFetcher::new(&config).unwrap()).unwrap();
    let outcome = harvester.run().await.unwrap();

    assert_eq!(outcome.report.details_fetched, 1);
    let row = &outcome.rows[0];
    assert_eq!(row.get("Title"), Some("Привет"));
    assert_eq!(row.get("Сегмент"), Some("Финтех"));
    assert_eq!(row.get("Город"), Some("Баку"));
    assert_eq!(
        row.get("Description"),
        Some("Компания помогает малому бизнесу принимать платежи по картам через интернет и вести учёт продаж.")
    );
}

#[tokio::test]
async fn test_bounded_mode_walks_page_numbers() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let pagination = r#"<ul class="pagination">
        <li><a href="/startup.html?page=1">1</a></li>
        <li><a href="/startup.html?page=2">2</a></li>
        <li><a href="/startup.html?page=3">3</a></li></ul>"#;
    for page in ["1", "2", "3"] {
        let body = format!(
            "<html><body>{}{}</body></html>",
            card(&format!("item{}", page), &format!("/startup-content/item{}", page)),
            pagination
        );
        mount_listing(&mock_server, page, body).await;
        mount_detail(
            &mock_server,
            &format!("item{}", page),
            detail_page(&format!("item{}", page), "SaaS", "x@y.az"),
        )
        .await;
    }

    let config = create_test_config(&base_url, "mode = \"bounded\"\nrespect-robots-txt = false");
    let harvester = Harvester::new(config.clone(), HttpFetcher::new(&config).unwrap()).unwrap();
    let outcome = harvester.run().await.unwrap();

    assert_eq!(outcome.report.listing_pages_crawled, 3);
    assert_eq!(outcome.report.stop_reason, Some(StopReason::BoundReached));
    assert_eq!(outcome.rows.len(), 3);
}
