//! Telegram digest delivery.
//!
//! Exactly one logical digest per run: postings grouped by company with
//! title, location and apply link, plus a note for every source that
//! failed. Messages longer than the transport limit are split on line
//! boundaries into numbered parts. Transient transport failures are
//! retried with exponential backoff; a persistent failure is fatal for
//! the run and must leave the seen-store untouched.

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::MonitorError;
use crate::types::{Posting, RunResult};

/// Telegram caps a single message at 4096 characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Reserved room per part for the `Part i/N` prefix.
const PART_HEADER_RESERVE: usize = 16;

pub struct TelegramNotifier {
    client: Client,
    token: String,
    chat_id: String,
    max_retries: u32,
}

impl TelegramNotifier {
    pub fn from_config(config: &Config) -> Result<Self, MonitorError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| MonitorError::Delivery {
                attempts: 0,
                reason: format!("failed to build client: {e}"),
            })?;
        Ok(Self {
            client,
            token: config.telegram_bot_token.clone(),
            chat_id: config.telegram_chat_id.clone(),
            max_retries: config.max_retries,
        })
    }

    /// Send the run digest, split into numbered parts when needed.
    pub fn notify(&self, result: &RunResult) -> Result<(), MonitorError> {
        let digest = format_digest(result, Utc::now());
        let parts = split_message(&digest, TELEGRAM_MESSAGE_LIMIT);
        for part in &parts {
            self.send_with_retry(part)?;
        }
        info!(parts = parts.len(), "digest delivered");
        Ok(())
    }

    /// Best-effort single message, used for fatal-error notifications.
    pub fn send_text(&self, text: &str) -> Result<(), MonitorError> {
        self.send_with_retry(text)
    }

    fn send_with_retry(&self, text: &str) -> Result<(), MonitorError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });

        let attempts = self.max_retries + 1;
        for attempt in 1..=attempts {
            match self.client.post(&url).json(&payload).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        // Telegram wraps errors in 200s as {"ok": false}.
                        let body: serde_json::Value =
                            resp.json().unwrap_or(serde_json::Value::Null);
                        if body["ok"].as_bool().unwrap_or(true) {
                            return Ok(());
                        }
                        return Err(MonitorError::Delivery {
                            attempts: attempt,
                            reason: body["description"]
                                .as_str()
                                .unwrap_or("Telegram rejected the message")
                                .to_string(),
                        });
                    }
                    if !is_transient_status(status) {
                        return Err(MonitorError::Delivery {
                            attempts: attempt,
                            reason: format!("HTTP {} from Telegram", status.as_u16()),
                        });
                    }
                    warn!(attempt, status = status.as_u16(), "transient delivery error");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "delivery request failed");
                }
            }
            if attempt < attempts {
                thread::sleep(Duration::from_millis(500u64 << (attempt - 1)));
            }
        }
        Err(MonitorError::Delivery {
            attempts,
            reason: "exhausted retries".to_string(),
        })
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Build the digest text for one run.
pub fn format_digest(result: &RunResult, now: DateTime<Utc>) -> String {
    let stamp = now.format("%Y-%m-%d %H:%M:%S");
    let mut lines: Vec<String> = Vec::new();

    if result.novel.is_empty() {
        lines.push(format!("🤖 Internship Monitor Report - {stamp}"));
        lines.push(String::new());
        lines.push("No new internship postings found in this run.".to_string());
    } else {
        lines.push(format!("🚀 Internship Monitor Report - {stamp}"));
        lines.push(format!(
            "Found {} new SWE internships in EU/UK:",
            result.novel.len()
        ));
        lines.push(String::new());

        for (company, postings) in group_by_company(&result.novel) {
            lines.push(format!("**{}** ({} positions):", company, postings.len()));
            for posting in postings {
                let location = if posting.location.is_empty() {
                    String::new()
                } else {
                    format!(" - {}", posting.location)
                };
                lines.push(format!(
                    "  • {}{} - [Apply]({})",
                    posting.title, location, posting.url
                ));
            }
            lines.push(String::new());
        }
    }

    let failed: Vec<String> = result
        .failed_sources()
        .map(|r| r.source.label().to_string())
        .collect();
    if !failed.is_empty() {
        lines.push(format!("⚠ Sources skipped after errors: {}", failed.join(", ")));
    }

    lines.join("\n").trim_end().to_string()
}

/// Group postings by company name, alphabetically.
fn group_by_company(postings: &[Posting]) -> BTreeMap<&str, Vec<&Posting>> {
    let mut by_company: BTreeMap<&str, Vec<&Posting>> = BTreeMap::new();
    for posting in postings {
        let company = if posting.company.is_empty() {
            posting.source.label()
        } else {
            posting.company.as_str()
        };
        by_company.entry(company).or_default().push(posting);
    }
    by_company
}

/// Split a digest into transport-sized parts on line boundaries.
///
/// Parts beyond the first carry a `Part i/N` prefix so the reader can
/// reassemble the logical digest. A single overlong line is hard-split.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    if text.len() <= limit {
        return vec![text.to_string()];
    }

    let chunk_limit = limit.saturating_sub(PART_HEADER_RESERVE).max(1);
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        for piece in hard_split(line, chunk_limit) {
            let needed = if current.is_empty() {
                piece.len()
            } else {
                current.len() + 1 + piece.len()
            };
            if needed > chunk_limit && !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(&piece);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| format!("Part {}/{}\n{}", i + 1, total, chunk))
        .collect()
}

/// Split one line into pieces of at most `chunk_limit` bytes on char
/// boundaries.
fn hard_split(line: &str, chunk_limit: usize) -> Vec<String> {
    if line.len() <= chunk_limit {
        return vec![line.to_string()];
    }
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in line.chars() {
        if current.len() + c.len_utf8() > chunk_limit {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(c);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
