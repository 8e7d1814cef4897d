//! Shared HTTP fetcher.
//!
//! One blocking client for the whole run, with browser-like default
//! headers, a rotating User-Agent, and a bounded retry loop for transient
//! failures. Collectors never talk to reqwest directly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, USER_AGENT};
use reqwest::StatusCode;
use tracing::warn;

use crate::config::Config;

/// Rotated across requests to look less like a single scripted client.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
];

pub struct HttpFetcher {
    client: Client,
    rate_limit_delay: Duration,
    max_retries: u32,
    ua_cursor: AtomicUsize,
}

impl HttpFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = Client::builder()
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .default_headers(headers)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            rate_limit_delay: config.rate_limit_delay,
            max_retries: config.max_retries,
            ua_cursor: AtomicUsize::new(0),
        })
    }

    /// Fetch a URL as text, retrying transient failures.
    ///
    /// Transient means a timeout, a connection error, or an HTTP 5xx/429
    /// response; those are retried up to `max_retries` times with a
    /// linearly growing delay. Any other HTTP error fails immediately.
    pub fn get_text(&self, url: &str, params: &[(&str, &str)]) -> Result<String> {
        for attempt in 1..=self.max_retries + 1 {
            let response = self
                .client
                .get(url)
                .query(params)
                .header(USER_AGENT, self.next_user_agent())
                .send();

            match response {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return resp
                            .text()
                            .with_context(|| format!("failed to read body from {}", url));
                    }
                    if !is_transient_status(status) {
                        bail!("HTTP {} from {}", status.as_u16(), url);
                    }
                    warn!(%url, attempt, status = status.as_u16(), "transient HTTP error");
                }
                Err(e) => {
                    if !(e.is_timeout() || e.is_connect() || e.is_request()) {
                        return Err(e).with_context(|| format!("request to {} failed", url));
                    }
                    warn!(%url, attempt, error = %e, "transient request failure");
                }
            }

            if attempt <= self.max_retries {
                thread::sleep(self.rate_limit_delay.mul_f64(attempt as f64));
            }
        }
        bail!(
            "failed to fetch {} after {} attempts",
            url,
            self.max_retries + 1
        )
    }

    fn next_user_agent(&self) -> &'static str {
        let i = self.ua_cursor.fetch_add(1, Ordering::Relaxed);
        USER_AGENTS[i % USER_AGENTS.len()]
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}
