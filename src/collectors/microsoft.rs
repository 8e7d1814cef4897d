//! Microsoft careers collector.
//!
//! University-track search on the careers portal, scoped to Europe.

use anyhow::Result;
use scraper::{Html, Selector};
use tracing::debug;

use super::{absolutize, element_text, Collector};
use crate::config::Config;
use crate::http::HttpFetcher;
use crate::types::{Posting, SourceId};

const SEARCH_URL: &str = "https://careers.microsoft.com/professionals/us/en/search-results";
const BASE_URL: &str = "https://careers.microsoft.com";

pub struct MicrosoftCareers;

impl Collector for MicrosoftCareers {
    fn source(&self) -> SourceId {
        SourceId::Microsoft
    }

    fn collect(&self, fetcher: &HttpFetcher, _config: &Config) -> Result<Vec<Posting>> {
        let html = fetcher.get_text(
            SEARCH_URL,
            &[
                ("keywords", "intern"),
                ("location", "Europe"),
                ("rt", "university"),
            ],
        )?;
        Ok(parse_search_results(&html))
    }
}

fn parse_search_results(html: &str) -> Vec<Posting> {
    let document = Html::parse_document(html);
    let card_selector =
        Selector::parse("div[data-ph-at-id='job-result-item']").expect("static selector");
    let title_selector =
        Selector::parse("a[data-ph-at-id='job-result-title']").expect("static selector");
    let location_selector =
        Selector::parse("span[data-ph-at-id='job-result-location']").expect("static selector");

    let mut postings = Vec::new();
    for card in document.select(&card_selector) {
        let (title_link, location_el) = match (
            card.select(&title_selector).next(),
            card.select(&location_selector).next(),
        ) {
            (Some(t), Some(l)) => (t, l),
            _ => {
                debug!("Microsoft card missing title or location, skipping");
                continue;
            }
        };
        let href = match title_link.value().attr("href") {
            Some(href) if !href.is_empty() => href,
            _ => continue,
        };

        postings.push(Posting::new(
            SourceId::Microsoft,
            "Microsoft",
            &element_text(&title_link),
            &element_text(&location_el),
            &absolutize(BASE_URL, href),
        ));
    }
    postings
}
