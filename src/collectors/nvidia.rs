//! Nvidia careers collector (Workday-hosted site).

use anyhow::Result;
use scraper::{Html, Selector};
use tracing::debug;

use super::{absolutize, first_text, Collector};
use crate::config::Config;
use crate::http::HttpFetcher;
use crate::types::{Posting, SourceId};

const SEARCH_URL: &str = "https://nvidia.wd5.myworkdayjobs.com/NVIDIAExternalCareerSite";
const BASE_URL: &str = "https://nvidia.wd5.myworkdayjobs.com";

/// University/intern job family group on the Workday site.
const JOB_FAMILY_GROUP: &str = "0c40f6bd1d8f10ae43ffbd1459047e84";

pub struct NvidiaCareers;

impl Collector for NvidiaCareers {
    fn source(&self) -> SourceId {
        SourceId::Nvidia
    }

    fn collect(&self, fetcher: &HttpFetcher, _config: &Config) -> Result<Vec<Posting>> {
        let html = fetcher.get_text(SEARCH_URL, &[("jobFamilyGroup", JOB_FAMILY_GROUP)])?;
        Ok(parse_search_results(&html))
    }
}

fn parse_search_results(html: &str) -> Vec<Posting> {
    let document = Html::parse_document(html);
    let card_selector =
        Selector::parse("li[data-automation-id='jobListItem'], div.job-card")
            .expect("static selector");
    let title_link_selector =
        Selector::parse("a[data-automation-id='jobTitle']").expect("static selector");
    let any_link_selector = Selector::parse("a[href]").expect("static selector");

    let mut postings = Vec::new();
    for card in document.select(&card_selector) {
        let title = match first_text(
            &card,
            &["a[data-automation-id='jobTitle']", "h3", "span[data-automation-id='jobTitle']"],
        ) {
            Some(t) => t,
            None => {
                debug!("Nvidia card without title, skipping");
                continue;
            }
        };

        // Workday lists every job family on fallback pages; keep the
        // student track only.
        let title_lower = title.to_lowercase();
        if !(title_lower.contains("intern") || title_lower.contains("student")) {
            continue;
        }

        let href = card
            .select(&title_link_selector)
            .next()
            .or_else(|| card.select(&any_link_selector).next())
            .and_then(|a| a.value().attr("href"))
            .unwrap_or_default();
        if href.is_empty() {
            continue;
        }

        let location = first_text(
            &card,
            &["span[data-automation-id='jobLocation']", "div.job-location"],
        )
        .unwrap_or_default();

        postings.push(Posting::new(
            SourceId::Nvidia,
            "Nvidia",
            &title,
            &location,
            &absolutize(BASE_URL, href),
        ));
    }
    postings
}
