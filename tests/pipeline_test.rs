//! Integration tests for the fetch-filter-dedupe-notify pipeline.
//!
//! Uses stub collectors and an in-memory seen-store; no network.

use std::time::Duration;

use anyhow::{anyhow, Result};
use internship_monitor::collectors::Collector;
use internship_monitor::config::Config;
use internship_monitor::http::HttpFetcher;
use internship_monitor::notify::format_digest;
use internship_monitor::pipeline;
use internship_monitor::seen_store::SeenStore;
use internship_monitor::types::{Posting, SourceId};

/// Collector returning a fixed posting list.
struct StaticSource {
    source: SourceId,
    postings: Vec<Posting>,
}

impl Collector for StaticSource {
    fn source(&self) -> SourceId {
        self.source
    }

    fn collect(&self, _fetcher: &HttpFetcher, _config: &Config) -> Result<Vec<Posting>> {
        Ok(self.postings.clone())
    }
}

/// Collector that fails on every attempt.
struct FailingSource(SourceId);

impl Collector for FailingSource {
    fn source(&self) -> SourceId {
        self.0
    }

    fn collect(&self, _fetcher: &HttpFetcher, _config: &Config) -> Result<Vec<Posting>> {
        Err(anyhow!("failed to fetch after 4 attempts"))
    }
}

fn test_config() -> Config {
    Config {
        rate_limit_delay: Duration::from_secs(0),
        ..Config::default()
    }
}

fn posting(source: SourceId, title: &str, location: &str, url: &str) -> Posting {
    Posting::new(source, source.label(), title, location, url)
}

fn static_source(source: SourceId, postings: Vec<Posting>) -> Box<dyn Collector> {
    Box::new(StaticSource { source, postings })
}

#[test]
fn duplicate_across_sources_is_notified_once() {
    let config = test_config();
    let fetcher = HttpFetcher::new(&config).unwrap();
    let store = SeenStore::open_in_memory().unwrap();

    let collectors: Vec<Box<dyn Collector>> = vec![
        static_source(
            SourceId::Apple,
            vec![posting(
                SourceId::Apple,
                "Software Engineering Intern",
                "London, UK",
                "https://jobs.example.com/role/1",
            )],
        ),
        static_source(
            SourceId::LinkedIn,
            vec![posting(
                SourceId::LinkedIn,
                "Software Engineering Intern",
                "London, UK",
                "https://jobs.example.com/role/1/",
            )],
        ),
    ];

    let result = pipeline::run(&collectors, &config, &fetcher, &store).unwrap();
    assert_eq!(result.fetched_total, 2);
    assert_eq!(result.unique_total, 1);
    assert_eq!(result.novel.len(), 1);
    // First collector in pipeline order wins attribution.
    assert_eq!(result.novel[0].source, SourceId::Apple);
}

#[test]
fn one_failing_source_does_not_block_the_others() {
    let config = test_config();
    let fetcher = HttpFetcher::new(&config).unwrap();
    let store = SeenStore::open_in_memory().unwrap();

    let collectors: Vec<Box<dyn Collector>> = vec![
        Box::new(FailingSource(SourceId::Nvidia)),
        static_source(
            SourceId::Spotify,
            vec![posting(
                SourceId::Spotify,
                "Backend Engineering Intern",
                "Stockholm, Sweden",
                "https://jobs.example.com/role/2",
            )],
        ),
    ];

    let result = pipeline::run(&collectors, &config, &fetcher, &store).unwrap();
    assert_eq!(result.novel.len(), 1);
    assert_eq!(result.novel[0].source, SourceId::Spotify);

    let failed: Vec<SourceId> = result.failed_sources().map(|r| r.source).collect();
    assert_eq!(failed, vec![SourceId::Nvidia]);

    // The digest reports the failure alongside the surviving results.
    let digest = format_digest(&result, chrono::Utc::now());
    assert!(digest.contains("Backend Engineering Intern"));
    assert!(digest.contains("Nvidia"));
}

#[test]
fn rerun_with_populated_store_yields_empty_novel_set() {
    let config = test_config();
    let fetcher = HttpFetcher::new(&config).unwrap();
    let mut store = SeenStore::open_in_memory().unwrap();

    let collectors: Vec<Box<dyn Collector>> = vec![static_source(
        SourceId::Google,
        vec![posting(
            SourceId::Google,
            "Software Engineering Intern, 2026",
            "Zurich, Switzerland",
            "https://jobs.example.com/role/3",
        )],
    )];

    let first = pipeline::run(&collectors, &config, &fetcher, &store).unwrap();
    assert_eq!(first.novel.len(), 1);
    store.mark_seen(&first.novel).unwrap();

    let second = pipeline::run(&collectors, &config, &fetcher, &store).unwrap();
    assert_eq!(second.matched_total, 1);
    assert!(second.novel.is_empty());
    assert_eq!(second.suppressed(), 1);
}

#[test]
fn delivery_failure_leaves_store_unchanged_and_postings_retried() {
    let config = test_config();
    let fetcher = HttpFetcher::new(&config).unwrap();
    let store = SeenStore::open_in_memory().unwrap();

    let collectors: Vec<Box<dyn Collector>> = vec![static_source(
        SourceId::Meta,
        vec![posting(
            SourceId::Meta,
            "Production Engineering Intern",
            "Dublin, Ireland",
            "https://jobs.example.com/role/4",
        )],
    )];

    // First run finds the posting; delivery fails, so mark_seen is never
    // called and the store stays as it was.
    let first = pipeline::run(&collectors, &config, &fetcher, &store).unwrap();
    assert_eq!(first.novel.len(), 1);
    assert!(store.is_empty().unwrap());

    // Next run re-discovers the same posting.
    let second = pipeline::run(&collectors, &config, &fetcher, &store).unwrap();
    assert_eq!(second.novel.len(), 1);
    assert_eq!(second.novel[0].url, first.novel[0].url);
}

#[test]
fn empty_run_reports_zero_counts_and_status_digest() {
    let config = test_config();
    let fetcher = HttpFetcher::new(&config).unwrap();
    let store = SeenStore::open_in_memory().unwrap();

    let collectors: Vec<Box<dyn Collector>> = vec![
        static_source(SourceId::Apple, vec![]),
        static_source(SourceId::Palantir, vec![]),
    ];

    let result = pipeline::run(&collectors, &config, &fetcher, &store).unwrap();
    assert_eq!(result.fetched_total, 0);
    assert_eq!(result.unique_total, 0);
    assert_eq!(result.matched_total, 0);
    assert!(result.novel.is_empty());

    let digest = format_digest(&result, chrono::Utc::now());
    assert!(digest.contains("No new internship postings"));
}

#[test]
fn non_matching_postings_are_filtered_out() {
    let config = test_config();
    let fetcher = HttpFetcher::new(&config).unwrap();
    let store = SeenStore::open_in_memory().unwrap();

    let collectors: Vec<Box<dyn Collector>> = vec![static_source(
        SourceId::LinkedIn,
        vec![
            // No SWE/internship keyword in the title.
            posting(
                SourceId::LinkedIn,
                "Head of People Operations",
                "Berlin, Germany",
                "https://jobs.example.com/role/5",
            ),
            // Outside EU/UK.
            posting(
                SourceId::LinkedIn,
                "Software Engineering Intern",
                "Austin, Texas",
                "https://jobs.example.com/role/6",
            ),
            posting(
                SourceId::LinkedIn,
                "Software Engineering Intern",
                "Amsterdam, Netherlands",
                "https://jobs.example.com/role/7",
            ),
        ],
    )];

    let result = pipeline::run(&collectors, &config, &fetcher, &store).unwrap();
    assert_eq!(result.fetched_total, 3);
    assert_eq!(result.matched_total, 1);
    assert_eq!(result.novel[0].url, "https://jobs.example.com/role/7");
}
