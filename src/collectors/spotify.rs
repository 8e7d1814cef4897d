//! Spotify careers collector.
//!
//! The students page has gone through several markups; the parser tries
//! the known card shapes first and falls back to scanning job-ish links,
//! the same strategy the site has historically needed.

use anyhow::Result;
use scraper::{ElementRef, Html, Selector};

use super::{absolutize, element_text, first_text, Collector};
use crate::config::Config;
use crate::http::HttpFetcher;
use crate::types::{Posting, SourceId};

const STUDENTS_URL: &str = "https://www.lifeatspotify.com/students";
const BASE_URL: &str = "https://www.lifeatspotify.com";
const DEFAULT_LOCATION: &str = "Stockholm, Sweden";

const CARD_SELECTORS: &str =
    "div.job-card, a.job-link, div[data-testid='job-listing'], li.job-item";

pub struct SpotifyCareers;

impl Collector for SpotifyCareers {
    fn source(&self) -> SourceId {
        SourceId::Spotify
    }

    fn collect(&self, fetcher: &HttpFetcher, _config: &Config) -> Result<Vec<Posting>> {
        let html = fetcher.get_text(STUDENTS_URL, &[])?;
        Ok(parse_students_page(&html))
    }
}

fn parse_students_page(html: &str) -> Vec<Posting> {
    let document = Html::parse_document(html);
    let card_selector = Selector::parse(CARD_SELECTORS).expect("static selector");

    let cards: Vec<ElementRef> = document.select(&card_selector).collect();
    let mut postings = Vec::new();

    if cards.is_empty() {
        // Fallback: any link that smells like a job posting.
        let link_selector = Selector::parse("a[href]").expect("static selector");
        for link in document.select(&link_selector) {
            let href = link.value().attr("href").unwrap_or_default();
            let text = element_text(&link);
            let href_lower = href.to_lowercase();
            if !(href_lower.contains("job")
                || href_lower.contains("career")
                || text.to_lowercase().contains("intern"))
            {
                continue;
            }
            push_candidate(&mut postings, &text, None, href);
        }
    } else {
        for card in cards {
            let title = first_text(&card, &["h3", "h2", "h4", "span.title", "div.title"])
                .unwrap_or_else(|| element_text(&card));
            let location =
                first_text(&card, &["span.location", "div.location", "p.location"]);
            let href = card
                .value()
                .attr("href")
                .map(str::to_string)
                .or_else(|| {
                    let link_selector = Selector::parse("a[href]").expect("static selector");
                    card.select(&link_selector)
                        .next()
                        .and_then(|a| a.value().attr("href").map(str::to_string))
                })
                .unwrap_or_default();
            push_candidate(&mut postings, &title, location, &href);
        }
    }
    postings
}

fn push_candidate(
    postings: &mut Vec<Posting>,
    title: &str,
    location: Option<String>,
    href: &str,
) {
    if href.is_empty() || title.is_empty() {
        return;
    }
    let title_lower = title.to_lowercase();
    if !(title_lower.contains("intern") || title_lower.contains("student")) {
        return;
    }
    let location = match location {
        Some(l) if !l.is_empty() => l,
        _ => DEFAULT_LOCATION.to_string(),
    };
    postings.push(Posting::new(
        SourceId::Spotify,
        "Spotify",
        title,
        &location,
        &absolutize(BASE_URL, href),
    ));
}
