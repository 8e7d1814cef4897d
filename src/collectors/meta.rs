//! Meta careers collector.
//!
//! The jobs page mixes university tracks with regular roles, so only
//! titles carrying an intern/university marker become candidates.

use anyhow::Result;
use scraper::{Html, Selector};
use tracing::debug;

use super::{absolutize, first_text, Collector};
use crate::config::Config;
use crate::http::HttpFetcher;
use crate::types::{Posting, SourceId};

const SEARCH_URL: &str = "https://www.metacareers.com/jobs";
const BASE_URL: &str = "https://www.metacareers.com";
const DEFAULT_LOCATION: &str = "London, UK";

pub struct MetaCareers;

impl Collector for MetaCareers {
    fn source(&self) -> SourceId {
        SourceId::Meta
    }

    fn collect(&self, fetcher: &HttpFetcher, _config: &Config) -> Result<Vec<Posting>> {
        let html = fetcher.get_text(
            SEARCH_URL,
            &[
                ("teams[0]", "University Grad - Business"),
                ("teams[1]", "University Grad - Engineering, Tech & Design"),
                ("teams[2]", "University Grad - PhD & Postdoc"),
                ("offices[0]", DEFAULT_LOCATION),
            ],
        )?;
        Ok(parse_search_results(&html))
    }
}

fn parse_search_results(html: &str) -> Vec<Posting> {
    let document = Html::parse_document(html);
    let card_selector =
        Selector::parse("div[data-testid='job-card'], a.job-card").expect("static selector");
    let link_selector = Selector::parse("a[href]").expect("static selector");

    let mut postings = Vec::new();
    for card in document.select(&card_selector) {
        let title = match first_text(&card, &["h3", "div.job-title"]) {
            Some(t) => t,
            None => {
                debug!("Meta card without title, skipping");
                continue;
            }
        };

        let href = card
            .value()
            .attr("href")
            .map(str::to_string)
            .or_else(|| {
                card.select(&link_selector)
                    .next()
                    .and_then(|a| a.value().attr("href").map(str::to_string))
            })
            .unwrap_or_default();
        // Anything that is not a job detail link is navigation chrome.
        if !href.contains("/jobs/") {
            continue;
        }

        let title_lower = title.to_lowercase();
        if !(title_lower.contains("intern") || title_lower.contains("university")) {
            continue;
        }

        let location = first_text(&card, &["span.location", "div.job-location"])
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());

        postings.push(Posting::new(
            SourceId::Meta,
            "Meta",
            &title,
            &location,
            &absolutize(BASE_URL, &href),
        ));
    }
    postings
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <div data-testid="job-card">
          <a href="/jobs/523"><h3>Software Engineer Intern</h3></a>
          <span class="location">London, UK</span>
        </div>
        <div data-testid="job-card">
          <a href="/jobs/524"><h3>Sales Director</h3></a>
        </div>
        <div data-testid="job-card">
          <a href="/about-us"><h3>University Grad Engineer</h3></a>
        </div>"#;

    #[test]
    fn keeps_only_intern_or_university_job_links() {
        let postings = parse_search_results(FIXTURE);
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].url, "https://www.metacareers.com/jobs/523");
        assert_eq!(postings[0].location, "London, UK");
    }

    #[test]
    fn missing_location_falls_back_to_london() {
        let html = r#"<a class="job-card" href="/jobs/9"><h3>Production Intern</h3></a>"#;
        let postings = parse_search_results(html);
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].location, "London, UK");
    }
}
