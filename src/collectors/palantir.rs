//! Palantir careers collector (Lever-hosted job board).

use anyhow::Result;
use scraper::{Html, Selector};
use tracing::debug;

use super::{element_text, first_text, Collector};
use crate::config::Config;
use crate::http::HttpFetcher;
use crate::types::{Posting, SourceId};

const BOARD_URL: &str = "https://jobs.lever.co/palantir";

pub struct PalantirCareers;

impl Collector for PalantirCareers {
    fn source(&self) -> SourceId {
        SourceId::Palantir
    }

    fn collect(&self, fetcher: &HttpFetcher, _config: &Config) -> Result<Vec<Posting>> {
        let html = fetcher.get_text(BOARD_URL, &[])?;
        Ok(parse_board(&html))
    }
}

fn parse_board(html: &str) -> Vec<Posting> {
    let document = Html::parse_document(html);
    let posting_selector = Selector::parse("div.posting").expect("static selector");
    let link_selector = Selector::parse("a[href]").expect("static selector");

    let mut postings = Vec::new();
    for card in document.select(&posting_selector) {
        let title = match first_text(&card, &["h5"]) {
            Some(t) => t,
            None => {
                debug!("Lever posting without title, skipping");
                continue;
            }
        };
        if !title.to_lowercase().contains("intern") {
            continue;
        }
        let location = card
            .select(&Selector::parse("span.sort-by-location").expect("static selector"))
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();
        // Lever hrefs are absolute.
        let url = match card
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            Some(href) if !href.is_empty() => href.to_string(),
            _ => continue,
        };

        postings.push(Posting::new(
            SourceId::Palantir,
            "Palantir",
            &title,
            &location,
            &url,
        ));
    }
    postings
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <div class="posting">
          <a href="https://jobs.lever.co/palantir/abc-123">
            <h5>Software Engineer Intern</h5>
            <span class="sort-by-location">London, United Kingdom</span>
          </a>
        </div>
        <div class="posting">
          <a href="https://jobs.lever.co/palantir/def-456">
            <h5>Forward Deployed Engineer</h5>
            <span class="sort-by-location">London, United Kingdom</span>
          </a>
        </div>"#;

    #[test]
    fn keeps_intern_postings_with_absolute_urls() {
        let postings = parse_board(FIXTURE);
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].url, "https://jobs.lever.co/palantir/abc-123");
        assert_eq!(postings[0].location, "London, United Kingdom");
    }
}
