use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of the collector that produced a posting.
///
/// One variant per employer career site plus the aggregator search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Apple,
    Microsoft,
    Google,
    Meta,
    Nvidia,
    Spotify,
    Palantir,
    LinkedIn,
}

impl SourceId {
    /// All sources in pipeline invocation order: employers first, the
    /// aggregator last.
    pub const ALL: &'static [SourceId] = &[
        SourceId::Apple,
        SourceId::Microsoft,
        SourceId::Google,
        SourceId::Meta,
        SourceId::Nvidia,
        SourceId::Spotify,
        SourceId::Palantir,
        SourceId::LinkedIn,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SourceId::Apple => "Apple",
            SourceId::Microsoft => "Microsoft",
            SourceId::Google => "Google",
            SourceId::Meta => "Meta",
            SourceId::Nvidia => "Nvidia",
            SourceId::Spotify => "Spotify",
            SourceId::Palantir => "Palantir",
            SourceId::LinkedIn => "LinkedIn",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A normalized internship listing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Posting {
    pub source: SourceId,
    /// Actual employer. Equals the collector label for employer collectors;
    /// aggregator hits carry whatever company the search returned.
    pub company: String,
    pub title: String,
    pub location: String,
    /// Canonical link, primary dedup key after normalization.
    pub url: String,
    pub fetched_at: DateTime<Utc>,
}

impl Posting {
    pub fn new(source: SourceId, company: &str, title: &str, location: &str, url: &str) -> Self {
        Self {
            source,
            company: company.to_string(),
            title: title.to_string(),
            location: location.to_string(),
            url: url.to_string(),
            fetched_at: Utc::now(),
        }
    }
}

/// Outcome of one collector invocation within a run.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: SourceId,
    pub fetched: usize,
    pub error: Option<String>,
}

impl SourceReport {
    pub fn ok(source: SourceId, fetched: usize) -> Self {
        Self {
            source,
            fetched,
            error: None,
        }
    }

    pub fn failed(source: SourceId, error: String) -> Self {
        Self {
            source,
            fetched: 0,
            error: Some(error),
        }
    }
}

/// Aggregate outcome of one pipeline execution.
///
/// Created fresh each run and discarded after the digest is sent; the
/// counts feed the notification message and the run log.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub started_at: DateTime<Utc>,
    pub reports: Vec<SourceReport>,
    /// Raw postings across all sources before any collapsing.
    pub fetched_total: usize,
    /// After in-run collapse of duplicate normalized URLs.
    pub unique_total: usize,
    /// After keyword/location filtering.
    pub matched_total: usize,
    /// Postings not present in the seen-store; the digest content.
    pub novel: Vec<Posting>,
}

impl RunResult {
    /// Postings suppressed because they were already notified in a
    /// previous run.
    pub fn suppressed(&self) -> usize {
        self.matched_total - self.novel.len()
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.reports.iter().filter(|r| r.error.is_some())
    }

    /// One-line run summary for the log.
    pub fn summary(&self) -> String {
        format!(
            "fetched={} unique={} matched={} novel={} suppressed={} failed_sources={}",
            self.fetched_total,
            self.unique_total,
            self.matched_total,
            self.novel.len(),
            self.suppressed(),
            self.failed_sources().count(),
        )
    }
}
