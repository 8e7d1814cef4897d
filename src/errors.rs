use std::io;

use thiserror::Error;

use crate::types::SourceId;

/// Error taxonomy for a monitoring run.
///
/// `Source` failures are recovered at the pipeline level and recorded in
/// the run result; the remaining variants abort the run with a non-zero
/// exit. A `Delivery` failure must leave the seen-store untouched so the
/// postings are retried on the next run.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("source '{source_id}' failed after {attempts} attempts: {reason}")]
    Source {
        source_id: SourceId,
        attempts: u32,
        reason: String,
    },
    #[error("notification delivery failed after {attempts} attempts: {reason}")]
    Delivery { attempts: u32, reason: String },
    #[error("seen-store failure: {0}")]
    Store(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl MonitorError {
    pub fn config(msg: impl Into<String>) -> Self {
        MonitorError::Config(msg.into())
    }
}
