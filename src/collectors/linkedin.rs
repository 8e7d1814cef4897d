//! LinkedIn aggregator collector.
//!
//! Runs the public jobs search for a small keyword × location grid and
//! normalizes the result cards. Companies already covered by a dedicated
//! collector are excluded so the digest never double-reports them. One
//! failing query is skipped; the source only fails as a whole when every
//! query failed.

use std::collections::HashSet;
use std::thread;

use anyhow::{bail, Result};
use scraper::{Html, Selector};
use tracing::{debug, warn};

use super::{first_text, looks_like_internship, Collector};
use crate::config::Config;
use crate::dedup;
use crate::http::HttpFetcher;
use crate::types::{Posting, SourceId};

const SEARCH_URL: &str = "https://www.linkedin.com/jobs/search";

/// Most effective query terms; kept short to stay under the site's rate
/// limits (the grid is keywords × locations requests per run).
const KEYWORDS: &[&str] = &[
    "software intern",
    "developer intern",
    "engineering intern",
    "backend intern",
];

const LOCATIONS: &[&str] = &[
    "United Kingdom",
    "Ireland",
    "Germany",
    "France",
    "Netherlands",
    "Sweden",
    "Denmark",
    "Norway",
];

#[derive(Default)]
pub struct LinkedInSearch;

impl Collector for LinkedInSearch {
    fn source(&self) -> SourceId {
        SourceId::LinkedIn
    }

    fn collect(&self, fetcher: &HttpFetcher, config: &Config) -> Result<Vec<Posting>> {
        let excluded = excluded_companies();
        let mut postings = Vec::new();
        let mut seen_urls: HashSet<String> = HashSet::new();
        let mut failures = 0usize;
        let total_queries = KEYWORDS.len() * LOCATIONS.len();

        for &location in LOCATIONS {
            for &keyword in KEYWORDS {
                match fetcher.get_text(SEARCH_URL, &[("keywords", keyword), ("location", location)])
                {
                    Ok(html) => {
                        for posting in parse_search_results(&html, location) {
                            if excluded.contains(posting.company.to_lowercase().as_str()) {
                                continue;
                            }
                            if seen_urls.insert(dedup::normalize_url(&posting.url)) {
                                postings.push(posting);
                            }
                        }
                    }
                    Err(e) => {
                        failures += 1;
                        warn!(keyword, location, error = %e, "LinkedIn query failed");
                    }
                }
                thread::sleep(config.rate_limit_delay);
            }
        }

        if failures == total_queries {
            bail!("all {} LinkedIn queries failed", total_queries);
        }
        Ok(postings)
    }
}

/// Companies with a dedicated collector, lowercase for comparison.
fn excluded_companies() -> HashSet<&'static str> {
    ["apple", "microsoft", "google", "meta", "nvidia", "spotify", "palantir"]
        .into_iter()
        .collect()
}

fn parse_search_results(html: &str, fallback_location: &str) -> Vec<Posting> {
    let document = Html::parse_document(html);
    let card_selector = Selector::parse("div.base-card, li div.base-search-card")
        .expect("static selector");
    let link_selector = Selector::parse("a.base-card__full-link, a[href]")
        .expect("static selector");

    let mut postings = Vec::new();
    for card in document.select(&card_selector) {
        let title = match first_text(&card, &["h3.base-search-card__title", "h3"]) {
            Some(t) => t,
            None => {
                debug!("LinkedIn card without title, skipping");
                continue;
            }
        };
        if !looks_like_internship(&title) {
            continue;
        }
        let title = clean_title(&title);
        let company = first_text(&card, &["h4.base-search-card__subtitle", "h4"])
            .unwrap_or_default();
        let location = first_text(&card, &["span.job-search-card__location"])
            .unwrap_or_else(|| fallback_location.to_string());
        let url = match card
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            Some(href) if !href.is_empty() => href.to_string(),
            _ => continue,
        };

        postings.push(Posting::new(
            SourceId::LinkedIn,
            &company,
            &title,
            &location,
            &url,
        ));
    }
    postings
}

/// Strip gender-marker suffixes common in EU listings, e.g.
/// "Software Engineer Intern (m/w/d)" or "Stagiaire (H/F)".
fn clean_title(title: &str) -> String {
    if let Ok(re) = regex::Regex::new(r"(?i)\s*\((?:[mwfdhx])(?:\s*/\s*[mwfdhx])+\)") {
        re.replace_all(title, "").trim().to_string()
    } else {
        title.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <div class="base-card">
          <a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/111"></a>
          <h3 class="base-search-card__title">Software Engineering Intern</h3>
          <h4 class="base-search-card__subtitle">Zalando</h4>
          <span class="job-search-card__location">Berlin, Germany</span>
        </div>
        <div class="base-card">
          <a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/112"></a>
          <h3 class="base-search-card__title">Staff Software Engineer</h3>
          <h4 class="base-search-card__subtitle">Some Corp</h4>
          <span class="job-search-card__location">Berlin, Germany</span>
        </div>"#;

    #[test]
    fn parses_internship_cards_with_company() {
        let postings = parse_search_results(FIXTURE, "Germany");
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].company, "Zalando");
        assert_eq!(postings[0].source, SourceId::LinkedIn);
    }

    #[test]
    fn missing_location_uses_query_location() {
        let html = r#"
            <div class="base-card">
              <a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/113"></a>
              <h3 class="base-search-card__title">Werkstudent Software (Praktikum)</h3>
              <h4 class="base-search-card__subtitle">Siemens</h4>
            </div>"#;
        let postings = parse_search_results(html, "Germany");
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].location, "Germany");
    }

    #[test]
    fn gender_markers_are_stripped_from_titles() {
        assert_eq!(
            clean_title("Software Engineer Intern (m/w/d)"),
            "Software Engineer Intern"
        );
        assert_eq!(clean_title("Stagiaire développement (H/F)"), "Stagiaire développement");
        assert_eq!(clean_title("Backend Intern"), "Backend Intern");
    }

    #[test]
    fn dedicated_collector_companies_are_excluded() {
        assert!(excluded_companies().contains("google"));
        assert!(!excluded_companies().contains("zalando"));
    }
}
