//! Pipeline orchestration.
//!
//! Invokes every collector in a fixed order with a rate-limit delay
//! between sources, isolates per-source failures, then merges, collapses,
//! filters and dedupes into the run result. Source failures never escalate
//! past this module; only a seen-store failure aborts the run.

use std::thread;

use chrono::Utc;
use tracing::{info, warn};

use crate::collectors::Collector;
use crate::config::Config;
use crate::dedup;
use crate::errors::MonitorError;
use crate::filter;
use crate::http::HttpFetcher;
use crate::seen_store::SeenStore;
use crate::types::{RunResult, SourceReport};

pub fn run(
    collectors: &[Box<dyn Collector>],
    config: &Config,
    fetcher: &HttpFetcher,
    store: &SeenStore,
) -> Result<RunResult, MonitorError> {
    let started_at = Utc::now();
    let mut reports = Vec::with_capacity(collectors.len());
    let mut merged = Vec::new();

    for (i, collector) in collectors.iter().enumerate() {
        let source = collector.source();
        info!(%source, "collecting");
        match collector.collect(fetcher, config) {
            Ok(postings) => {
                info!(%source, fetched = postings.len(), "source done");
                reports.push(SourceReport::ok(source, postings.len()));
                merged.extend(postings);
            }
            Err(e) => {
                let err = MonitorError::Source {
                    source_id: source,
                    attempts: config.max_retries + 1,
                    reason: e.to_string(),
                };
                warn!(%source, error = %err, "source failed, continuing");
                reports.push(SourceReport::failed(source, err.to_string()));
            }
        }
        if i + 1 < collectors.len() {
            thread::sleep(config.rate_limit_delay);
        }
    }

    let fetched_total = merged.len();
    let unique = dedup::collapse_in_run(merged);
    let unique_total = unique.len();

    let matched: Vec<_> = unique
        .into_iter()
        .filter(|p| filter::matches(p, config))
        .collect();
    let matched_total = matched.len();

    let novel = dedup::novel_against_store(matched, store)?;

    let result = RunResult {
        started_at,
        reports,
        fetched_total,
        unique_total,
        matched_total,
        novel,
    };
    info!(summary = %result.summary(), "pipeline finished");
    Ok(result)
}
