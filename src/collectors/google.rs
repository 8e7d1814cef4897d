//! Google careers collector.
//!
//! The jobs search endpoint takes repeated `location` and `company`
//! parameters; the intern employment type keeps the result set small.

use anyhow::Result;
use scraper::{Html, Selector};
use tracing::debug;

use super::{absolutize, first_text, Collector};
use crate::config::Config;
use crate::http::HttpFetcher;
use crate::types::{Posting, SourceId};

const SEARCH_URL: &str = "https://www.google.com/about/careers/applications/jobs/results/";
const BASE_URL: &str = "https://www.google.com";

const COMPANIES: &[&str] = &["Fitbit", "Google", "YouTube"];

const LOCATIONS: &[&str] = &[
    "United Kingdom", "Ireland", "Germany", "France", "Netherlands", "Sweden",
    "Denmark", "Norway", "Finland", "Belgium", "Austria", "Switzerland", "Poland",
    "Spain", "Italy", "Czech Republic",
];

pub struct GoogleCareers;

impl Collector for GoogleCareers {
    fn source(&self) -> SourceId {
        SourceId::Google
    }

    fn collect(&self, fetcher: &HttpFetcher, _config: &Config) -> Result<Vec<Posting>> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        for &company in COMPANIES {
            params.push(("company", company));
        }
        for &location in LOCATIONS {
            params.push(("location", location));
        }
        params.push(("distance", "50"));
        params.push(("employment_type", "INTERN"));

        let html = fetcher.get_text(SEARCH_URL, &params)?;
        Ok(parse_search_results(&html))
    }
}

fn parse_search_results(html: &str) -> Vec<Posting> {
    let document = Html::parse_document(html);
    let card_selector = Selector::parse("div[data-job-id]").expect("static selector");
    let link_selector = Selector::parse("a[href]").expect("static selector");

    let mut postings = Vec::new();
    for card in document.select(&card_selector) {
        let title = match first_text(&card, &["h3", "a[data-gtm-event-name='job-click']"]) {
            Some(t) => t,
            None => {
                debug!("Google card without title, skipping");
                continue;
            }
        };
        let location = first_text(&card, &["span.job-location"]).unwrap_or_default();
        let href = card
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default();
        if href.is_empty() {
            continue;
        }

        postings.push(Posting::new(
            SourceId::Google,
            "Google",
            &title,
            &location,
            &absolutize(BASE_URL, href),
        ));
    }
    postings
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <div data-job-id="7">
          <a href="/about/careers/applications/jobs/results/7-swe-intern">
            <h3>Software Engineering Intern, Summer 2026</h3>
          </a>
          <span class="job-location">Zurich, Switzerland</span>
        </div>
        <div data-job-id="8"><p>no title or link</p></div>"#;

    #[test]
    fn parses_cards_with_title_and_link() {
        let postings = parse_search_results(FIXTURE);
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "Software Engineering Intern, Summer 2026");
        assert_eq!(postings[0].location, "Zurich, Switzerland");
        assert!(postings[0].url.starts_with("https://www.google.com/about/"));
    }
}
