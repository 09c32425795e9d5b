//! Integration tests for the harvester
//!
//! These tests use wiremock to serve quote search pages and run the
//! HTTP fetcher, the frontier engine and SQLite storage end-to-end.

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use wordtrail::config::{
    Config, OutputConfig, PolitenessConfig, SourceConfig, TermsConfig, UserAgentConfig,
    DEFAULT_PUNCTUATION,
};
use wordtrail::crawler::{Coordinator, HttpFetcher};
use wordtrail::output::export_quotes_json;
use wordtrail::storage::{open_storage, RunStatus, SqliteStorage, Storage};
use wordtrail::{PageCursor, TermState, TrailError};

/// Creates a test configuration pointing at the mock search endpoint
fn create_test_config(base_url: &str, seeds: &[&str], db_path: &str) -> Config {
    Config {
        source: SourceConfig {
            base_url: format!("{}/search", base_url),
            max_pages: 100,
        },
        politeness: PolitenessConfig {
            wait_lower: 0,
            wait_upper: 0,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
        terms: TermsConfig {
            seeds: seeds.iter().map(|s| s.to_string()).collect(),
            punctuation: DEFAULT_PUNCTUATION.to_string(),
        },
    }
}

fn open_coordinator(config: &Config) -> Coordinator<SqliteStorage, HttpFetcher> {
    let storage = open_storage(std::path::Path::new(&config.output.database_path))
        .expect("Failed to open storage");
    let fetcher = HttpFetcher::new(config).expect("Failed to build fetcher");
    Coordinator::new(config, storage, fetcher).expect("Failed to create coordinator")
}

/// Renders one search result page the way the quote site marks it up
fn results_page(quotes: &[(&str, &str)], current: u32, total: u32) -> String {
    let blocks: Vec<String> = quotes
        .iter()
        .map(|(text, author)| {
            format!(
                r#"<div class="quote mediumText">
                  <div class="quoteDetails">
                    <div class="quoteText">
                      “{}”
                      <br>
                      ―
                      <span class="authorOrTitle">{},</span>
                    </div>
                    <div class="quoteFooter">
                      <div class="greyText smallText left">tags:
                        <a href="/quotes/tag/test">test</a>
                      </div>
                      <div class="right"><a class="smallText" href="/quotes/1">3 likes</a></div>
                    </div>
                  </div>
                </div>"#,
                text, author
            )
        })
        .collect();

    let pagination = if total > 1 {
        let links: Vec<String> = (1..=total)
            .map(|n| {
                if n == current {
                    format!(r#"<em class="current">{}</em>"#, n)
                } else {
                    format!(r#"<a href="?page={0}">{0}</a>"#, n)
                }
            })
            .collect();
        format!(
            r#"<div style="text-align: right">{}<a class="next_page" href="?page={}">next »</a></div>"#,
            links.join(" "),
            current + 1
        )
    } else {
        String::new()
    };

    format!(
        "<html><head><title>Quotes</title></head><body><div class=\"leftContainer\">{}</div>{}</body></html>",
        blocks.join("\n"),
        pagination
    )
}

/// Mounts one result page for `term`
async fn mount_page(server: &MockServer, term: &str, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", term))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Every other search returns an empty result page
async fn mount_no_results(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><p>No results.</p></body></html>")
                .insert_header("content-type", "text/html"),
        )
        .with_priority(10)
        .mount(server)
        .await;
}

/// Pages requested for `term`, in order
async fn requested_pages(server: &MockServer, term: &str) -> Vec<u32> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| {
            request
                .url
                .query_pairs()
                .any(|(key, value)| key == "q" && value == term)
        })
        .filter_map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "page")
                .and_then(|(_, value)| value.parse().ok())
        })
        .collect()
}

#[tokio::test]
async fn test_collect_until_frontier_is_exhausted() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "love",
        1,
        results_page(
            &[("Love conquers all", "Virgil"), ("Love is patient", "Paul")],
            1,
            2,
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "love",
        2,
        results_page(&[("Love is blind", "Shakespeare")], 2, 2),
    )
    .await;
    mount_no_results(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("quotes.db");
    let config = create_test_config(&mock_server.uri(), &["love"], db_path.to_str().unwrap());
    let mut coordinator = open_coordinator(&config);

    let collected = coordinator
        .collect_up_to(1_000)
        .await
        .expect("Collection failed");

    assert_eq!(collected, 3);
    assert_eq!(requested_pages(&mock_server, "love").await, vec![1, 2]);

    let storage = coordinator.storage();
    assert_eq!(storage.count_quotes().unwrap(), 3);
    assert_eq!(storage.term_state("love").unwrap(), Some(TermState::Done));
    // Every discovered word was searched once and came back empty
    assert_eq!(storage.count_pending_terms().unwrap(), 0);
    for term in ["Love", "conquers", "all", "patient", "blind"] {
        assert_eq!(storage.term_state(term).unwrap(), Some(TermState::Done));
        assert_eq!(requested_pages(&mock_server, term).await, vec![1]);
    }
    assert_eq!(storage.load_cursor().unwrap(), None);

    let run = storage.get_latest_run().unwrap().expect("Run not recorded");
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.collected, 3);
}

#[tokio::test]
async fn test_resume_after_restart() {
    let mock_server = MockServer::start().await;
    for (page, texts) in [
        (1, [("Life is short", "Seneca"), ("Life goes on", "Frost")]),
        (2, [("Life is a journey", "Emerson"), ("Life is art", "Wilde")]),
        (3, [("Life is now", "Tolle"), ("Life happens", "Lennon")]),
    ] {
        mount_page(&mock_server, "life", page, results_page(&texts, page, 3)).await;
    }
    mount_no_results(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("quotes.db");
    let config = create_test_config(&mock_server.uri(), &["life"], db_path.to_str().unwrap());

    // First process: the quota is met on page 2
    {
        let mut coordinator = open_coordinator(&config);
        let collected = coordinator.collect_up_to(3).await.expect("First run failed");
        assert_eq!(collected, 4);
        assert_eq!(
            coordinator.storage().load_cursor().unwrap(),
            Some(PageCursor::new("life", 2))
        );
        assert_eq!(
            coordinator.storage().term_state("life").unwrap(),
            Some(TermState::Pending)
        );
    }

    // Second process on the same database
    let mut coordinator = open_coordinator(&config);
    let collected = coordinator.collect_up_to(2).await.expect("Second run failed");

    assert_eq!(requested_pages(&mock_server, "life").await, vec![1, 2, 2, 3]);
    assert_eq!(collected, 2);
    assert_eq!(coordinator.storage().count_quotes().unwrap(), 6);
}

#[tokio::test]
async fn test_server_error_keeps_cursor() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "hope",
        1,
        results_page(&[("Hope is a waking dream", "Aristotle")], 1, 3),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "hope"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_no_results(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("quotes.db");
    let config = create_test_config(&mock_server.uri(), &["hope"], db_path.to_str().unwrap());
    let mut coordinator = open_coordinator(&config);

    coordinator.collect_up_to(1).await.expect("First run failed");
    assert_eq!(
        coordinator.storage().load_cursor().unwrap(),
        Some(PageCursor::new("hope", 1))
    );

    let result = coordinator.collect_up_to(10).await;

    match result {
        Err(TrailError::Status { status, url }) => {
            assert_eq!(status, 500);
            assert!(url.contains("page=2"));
        }
        other => panic!("Expected status error, got {:?}", other.map(|_| ())),
    }
    let storage = coordinator.storage();
    assert_eq!(storage.load_cursor().unwrap(), Some(PageCursor::new("hope", 1)));
    assert_eq!(storage.term_state("hope").unwrap(), Some(TermState::Pending));
    assert_eq!(storage.count_quotes().unwrap(), 1);
    assert_eq!(
        storage.get_latest_run().unwrap().map(|run| run.status),
        Some(RunStatus::Failed)
    );
}

#[tokio::test]
async fn test_process_term_then_export_and_dump() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "dream",
        1,
        results_page(
            &[
                ("All our dreams can come true", "Walt Disney"),
                ("Dream big", "Anonymous"),
            ],
            1,
            1,
        ),
    )
    .await;
    mount_no_results(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("quotes.db");
    let config = create_test_config(&mock_server.uri(), &["seed"], db_path.to_str().unwrap());
    let mut coordinator = open_coordinator(&config);

    let progress = coordinator
        .process_term("dream")
        .await
        .expect("Processing failed");

    assert!(progress.completed());
    assert_eq!(progress.collected, 2);
    assert_eq!(progress.pages_fetched, 1);
    // The seed was never touched
    assert_eq!(
        coordinator.storage().term_state("seed").unwrap(),
        Some(TermState::Pending)
    );

    let export_path = dir.path().join("quotes.jsonl");
    let written = export_quotes_json(coordinator.storage(), &export_path).expect("Export failed");
    assert_eq!(written, 2);

    let exported = std::fs::read_to_string(&export_path).unwrap();
    let records: Vec<serde_json::Value> = exported
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records[0]["text"], "All our dreams can come true");
    assert_eq!(records[0]["author"], "Walt Disney");
    assert_eq!(records[0]["tags"][0], "test");
    assert_eq!(records[0]["likes"], 3);
    assert_eq!(records[1]["term"], "dream");

    let dump_path = dir.path().join("copy.db");
    coordinator
        .storage()
        .dump_to(&dump_path)
        .expect("Dump failed");
    let copy = SqliteStorage::new(&dump_path).expect("Failed to open dump");
    assert_eq!(copy.count_quotes().unwrap(), 2);
    assert_eq!(copy.term_state("dream").unwrap(), Some(TermState::Done));
}

#[tokio::test]
async fn test_requests_identify_the_crawler() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header(
            "user-agent",
            "TestBot/1.0.0 (+https://example.com/contact; test@example.com)",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(results_page(&[("Be kind", "Anonymous")], 1, 1)),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .with_priority(10)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("quotes.db");
    let config = create_test_config(&mock_server.uri(), &["kind"], db_path.to_str().unwrap());
    let mut coordinator = open_coordinator(&config);

    let progress = coordinator
        .process_term("kind")
        .await
        .expect("Request was rejected");

    assert_eq!(progress.collected, 1);
}

#[tokio::test]
async fn test_page_cap_limits_requests() {
    let mock_server = MockServer::start().await;
    for page in 1..=5 {
        let text = format!("Courage number {}", page);
        mount_page(
            &mock_server,
            "courage",
            page,
            results_page(&[(text.as_str(), "Maya Angelou")], page, 5),
        )
        .await;
    }
    mount_no_results(&mock_server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("quotes.db");
    let mut config =
        create_test_config(&mock_server.uri(), &["courage"], db_path.to_str().unwrap());
    config.source.max_pages = 2;
    let mut coordinator = open_coordinator(&config);

    let progress = coordinator
        .process_term("courage")
        .await
        .expect("Processing failed");

    assert!(progress.completed());
    assert_eq!(requested_pages(&mock_server, "courage").await, vec![1, 2]);
    assert_eq!(coordinator.storage().count_quotes().unwrap(), 2);
}
