//! Integration tests for Shelf Match
//!
//! These tests run the full pipeline: Goodreads export → search tasks →
//! concurrent batch search against a mock catalog → rendered report.

use shelf_match::config::{Config, MatchingConfig};
use shelf_match::input::read_tasks_from_reader;
use shelf_match::matching::MatchScorer;
use shelf_match::models::{CandidateBuilder, MatchType, Query, SearchTask};
use shelf_match::output::{render, write_report, OutputFormat, ReportMetadata};
use shelf_match::search::{FetchPolicy, Orchestrator, SearchOptions};
use shelf_match::sources::{CatalogError, MockCatalog};
use std::sync::Arc;
use std::time::Duration;

const EXPORT: &str = r#"Book Id,Title,Author,ISBN,ISBN13,Bookshelves,Exclusive Shelf
10,The Name of the Wind (The Kingkiller Chronicle #1),Patrick Rothfuss,"=""""","=""""",to-read,to-read
11,Deep Learning,Ian Goodfellow,"=""""","=""9780262035613""",to-read,to-read
12,Emma,Jane Austen,"=""""","=""""",,read
13,Dragon Heart,Cecelia Holland,"=""""","=""""",to-read,to-read
14,Ancillary Justice,Ann Leckie,"=""""","=""""",to-read,to-read
"#;

fn catalog() -> MockCatalog {
    MockCatalog::new()
        .with_candidates(
            "The Name of the Wind (The Kingkiller Chronicle #1)",
            vec![
                CandidateBuilder::new("The Wise Man's Fear").price("$12.99").build(),
                CandidateBuilder::new("The Name of the Wind")
                    .price("$9.99")
                    .url("https://bookoutlet.ca/products/name-of-the-wind")
                    .build(),
            ],
        )
        .with_candidates(
            "Deep Learning",
            vec![CandidateBuilder::new("Adaptive Computation and Machine Learning Series")
                .isbn("0262035618")
                .build()],
        )
        .with_candidates(
            "Dragon Heart",
            vec![CandidateBuilder::new("Dragon Heart Zen").build()],
        )
        .with_candidates(
            "Ancillary Justice",
            vec![CandidateBuilder::new("Ancillary Justice")
                .author("Frank Herbert")
                .build()],
        )
        .with_delay(
            "The Name of the Wind (The Kingkiller Chronicle #1)",
            Duration::from_millis(80),
        )
}

fn orchestrator(catalog: MockCatalog, matching: MatchingConfig) -> Orchestrator {
    let scorer = Arc::new(MatchScorer::new(matching).unwrap());
    Orchestrator::new(
        Arc::new(catalog),
        scorer,
        SearchOptions {
            workers: 3,
            pacing: Duration::ZERO,
            fetch_policy: FetchPolicy::Concurrent,
        },
    )
    .unwrap()
}

fn tasks() -> Vec<SearchTask> {
    read_tasks_from_reader(EXPORT.as_bytes(), "to-read").unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pipeline_finds_matches_in_shelf_order() {
    let tasks = tasks();
    assert_eq!(tasks.len(), 4);

    let results = orchestrator(catalog(), MatchingConfig::default())
        .search_batch(tasks, |_, _| {})
        .await;

    let titles: Vec<&str> = results.iter().map(|r| r.query_title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "The Name of the Wind (The Kingkiller Chronicle #1)",
            "Deep Learning",
            "Dragon Heart",
            "Ancillary Justice",
        ]
    );

    assert_eq!(results[0].matched_title, "The Name of the Wind");
    assert_eq!(results[0].price.as_deref(), Some("$9.99"));

    // ISBN-13 on the shelf, ISBN-10 in the catalog
    assert_eq!(results[1].match_type, MatchType::IsbnExact);
    assert_eq!(results[1].score, 100);

    assert_eq!(results[2].score, 90);
}

#[tokio::test]
async fn test_threshold_is_inclusive() {
    let strict = MatchingConfig {
        threshold: 91,
        ..MatchingConfig::default()
    };
    let task = vec![SearchTask::new(0, Query::new("Dragon Heart").unwrap())];

    let at_90 = orchestrator(catalog(), MatchingConfig::default())
        .search_batch(task.clone(), |_, _| {})
        .await;
    let at_91 = orchestrator(catalog(), strict)
        .search_batch(task, |_, _| {})
        .await;

    assert_eq!(at_90.len(), 1);
    assert!(at_91.is_empty());
}

#[tokio::test]
async fn test_author_requirement_rejects_mismatch() {
    let matching = MatchingConfig {
        require_author_match: true,
        ..MatchingConfig::default()
    };

    let results = orchestrator(catalog(), matching)
        .search_batch(tasks(), |_, _| {})
        .await;

    assert!(results
        .iter()
        .all(|r| r.query_title != "Ancillary Justice"));
    // The ISBN match is exempt from the author policy
    assert!(results.iter().any(|r| r.query_title == "Deep Learning"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failures_do_not_abort_batch() {
    let catalog = catalog().with_failure(
        "Deep Learning",
        CatalogError::Api("BookOutlet returned status: 500".to_string()),
    );

    let mut progress = Vec::new();
    let report = orchestrator(catalog, MatchingConfig::default())
        .search_batch_until(
            tasks(),
            |done, _| progress.push(done),
            std::future::pending(),
        )
        .await;

    assert_eq!(report.failed, 1);
    assert_eq!(report.completed, 3);
    assert_eq!(progress, vec![1, 2, 3, 4]);
    assert!(report
        .results
        .iter()
        .all(|r| r.query_title != "Deep Learning"));
}

#[tokio::test]
async fn test_reports_render_batch_results() {
    let tasks = tasks();
    let total = tasks.len();
    let results = orchestrator(catalog(), MatchingConfig::default())
        .search_batch(tasks, |_, _| {})
        .await;
    let metadata = ReportMetadata::new(total, 90);

    let markdown = render(OutputFormat::Markdown, &results, &metadata).unwrap();
    assert!(markdown.contains("Found **4** matches out of **4** books (threshold: 90%)."));
    assert!(markdown.contains("[View](https://bookoutlet.ca/products/name-of-the-wind)"));

    let json: serde_json::Value =
        serde_json::from_str(&render(OutputFormat::Json, &results, &metadata).unwrap()).unwrap();
    assert_eq!(json["metadata"]["total_matches"], 4);
    assert_eq!(json["matches"][1]["match_type"], "isbn_exact");

    // Exact titles and the ISBN match are certain; the 90% title is not
    let html = render(OutputFormat::Html, &results, &metadata).unwrap();
    assert!(html.contains("<strong>3</strong> certain, <strong>1</strong> potential."));
    assert!(html.contains("<h2 id=\"potential\">Potential Matches (1)</h2>"));

    let dir = tempfile::tempdir().unwrap();
    let written = write_report(&dir.path().join("output"), OutputFormat::Csv, &results, &metadata)
        .unwrap();
    assert_eq!(written.extension().unwrap(), "csv");
    let csv = std::fs::read_to_string(written).unwrap();
    assert_eq!(csv.lines().count(), 5);
}

#[test]
fn test_default_config_builds_scorer_and_options() {
    let config = Config::default();
    assert!(MatchScorer::new(config.matching.clone()).is_ok());

    let options = SearchOptions::from(&config.parallel);
    assert_eq!(options.workers, 5);
    assert_eq!(options.pacing, Duration::from_millis(100));
    assert!(options.validate().is_ok());
}
