//! Run controller.
//!
//! One invocation = one run: load config, open the seen-store, run the
//! pipeline, deliver the digest, and only then mark the novel postings as
//! seen. Delivery failure leaves the store untouched so the postings are
//! retried on the next scheduled run.

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use internship_monitor::collectors;
use internship_monitor::config::{ensure_parent_dir, Config};
use internship_monitor::errors::MonitorError;
use internship_monitor::http::HttpFetcher;
use internship_monitor::notify::TelegramNotifier;
use internship_monitor::pipeline;
use internship_monitor::seen_store::SeenStore;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("fatal: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_logging(&config) {
        eprintln!("fatal: could not open log file: {e}");
        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), MonitorError> {
    info!("starting internship monitoring run");

    let mut store = SeenStore::open(&config.seen_store_path())?;
    let purged = store.cleanup_old(config.seen_retention_days)?;
    if purged > 0 {
        info!(purged, days = config.seen_retention_days, "purged expired seen entries");
    }

    let notifier = TelegramNotifier::from_config(config)?;
    let fetcher = HttpFetcher::new(config).map_err(|e| MonitorError::config(e.to_string()))?;
    let collectors = collectors::default_collectors();

    let result = match pipeline::run(&collectors, config, &fetcher, &store) {
        Ok(result) => result,
        Err(e) => {
            // Best effort only; the original failure is what gets reported.
            let _ = notifier.send_text(&format!(
                "🚨 Internship Monitor Error - {}\n\n{}",
                Utc::now().format("%Y-%m-%d %H:%M:%S"),
                e
            ));
            return Err(e);
        }
    };

    for report in result.failed_sources() {
        error!(source = %report.source, error = report.error.as_deref().unwrap_or("unknown"), "source failed this run");
    }

    if result.novel.is_empty() && !config.notify_when_empty {
        info!("no novel postings and empty-run notification disabled, skipping delivery");
    } else {
        notifier.notify(&result)?;
    }

    // Mark seen strictly after delivery so a failed digest is retried.
    let inserted = store.mark_seen(&result.novel)?;
    info!(
        inserted,
        summary = %result.summary(),
        "monitoring run completed"
    );
    Ok(())
}

/// Log to stdout and to the append-only run log under the state root.
fn init_logging(config: &Config) -> Result<(), MonitorError> {
    let log_path = config.log_path();
    ensure_parent_dir(&log_path)?;
    let log_file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();
    Ok(())
}
