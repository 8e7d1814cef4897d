//! Source collectors.
//!
//! One collector per employer career site plus the LinkedIn aggregator
//! search. All of them speak the same contract so the downstream stages
//! never special-case by source; per-listing parse failures are skipped,
//! only a whole-source fetch failure surfaces as an error.

mod apple;
mod google;
mod linkedin;
mod meta;
mod microsoft;
mod nvidia;
mod palantir;
mod spotify;

use anyhow::Result;
use scraper::ElementRef;

use crate::config::Config;
use crate::http::HttpFetcher;
use crate::types::{Posting, SourceId};

pub use linkedin::LinkedInSearch;

/// Contract for one posting source.
pub trait Collector {
    fn source(&self) -> SourceId;

    /// Fetch and parse this source into candidate postings.
    ///
    /// An `Err` means the source is unusable this run (after the fetcher's
    /// retries); the pipeline records it and continues with other sources.
    fn collect(&self, fetcher: &HttpFetcher, config: &Config) -> Result<Vec<Posting>>;
}

/// The full production collector set, in deterministic pipeline order:
/// employer sites first, the aggregator search last.
pub fn default_collectors() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(apple::AppleCareers),
        Box::new(microsoft::MicrosoftCareers),
        Box::new(google::GoogleCareers),
        Box::new(meta::MetaCareers),
        Box::new(nvidia::NvidiaCareers),
        Box::new(spotify::SpotifyCareers),
        Box::new(palantir::PalantirCareers),
        Box::new(LinkedInSearch::default()),
    ]
}

/// Collapsed text content of an element.
pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty text found under any of the given selectors.
pub(crate) fn first_text(element: &ElementRef, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = scraper::Selector::parse(selector_str) {
            if let Some(found) = element.select(&selector).next() {
                let text = element_text(&found);
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

/// Resolve an href against the site base, tolerating already-absolute
/// links and protocol-relative links.
pub(crate) fn absolutize(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    let base = base.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{}{}", base, href)
    } else {
        format!("{}/{}", base, href)
    }
}

/// Internship markers used by collectors whose listings mix internships
/// with regular roles, including common EU-language variants.
pub(crate) fn looks_like_internship(title: &str) -> bool {
    const MARKERS: &[&str] = &[
        "intern",
        "internship",
        "trainee",
        "graduate",
        "student",
        "placement",
        "working student",
        "apprentice",
        "stage",
        "praktikum",
        "stagiaire",
    ];
    let title_lower = title.to_lowercase();
    MARKERS.iter().any(|m| title_lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_covers_all_sources_in_order() {
        let collectors = default_collectors();
        let sources: Vec<SourceId> = collectors.iter().map(|c| c.source()).collect();
        assert_eq!(sources, SourceId::ALL);
    }

    #[test]
    fn absolutize_handles_relative_and_absolute() {
        assert_eq!(
            absolutize("https://jobs.apple.com", "/en-us/details/1"),
            "https://jobs.apple.com/en-us/details/1"
        );
        assert_eq!(
            absolutize("https://jobs.apple.com", "https://other.example/x"),
            "https://other.example/x"
        );
        assert_eq!(
            absolutize("https://jobs.apple.com", "//cdn.example/x"),
            "https://cdn.example/x"
        );
    }

    #[test]
    fn internship_markers_cover_eu_variants() {
        assert!(looks_like_internship("Praktikum Softwareentwicklung"));
        assert!(looks_like_internship("Stage ingénieur logiciel"));
        assert!(looks_like_internship("Software Engineering Intern"));
        assert!(!looks_like_internship("Senior Staff Engineer"));
    }
}
