//! Apple careers collector.
//!
//! Hits the public search page scoped to the internships team and EU/UK
//! storefront locations, then reads the result table rows.

use anyhow::Result;
use scraper::{Html, Selector};
use tracing::debug;

use super::{absolutize, element_text, Collector};
use crate::config::Config;
use crate::http::HttpFetcher;
use crate::types::{Posting, SourceId};

const SEARCH_URL: &str = "https://jobs.apple.com/en-us/search";
const BASE_URL: &str = "https://jobs.apple.com";

const LOCATION_PARAM: &str = "united-kingdom-GBR+czechia-CZE+germany-DEU+ireland-IRL\
+france-FRA+italy-ITA+spain-ESP+netherlands-NLD+sweden-SWE+denmark-DNK+norway-NOR\
+finland-FIN+belgium-BEL+austria-AUT+switzerland-CHE+poland-POL";

pub struct AppleCareers;

impl Collector for AppleCareers {
    fn source(&self) -> SourceId {
        SourceId::Apple
    }

    fn collect(&self, fetcher: &HttpFetcher, _config: &Config) -> Result<Vec<Posting>> {
        let html = fetcher.get_text(
            SEARCH_URL,
            &[
                ("search", "software engineer"),
                ("sort", "relevance"),
                ("location", LOCATION_PARAM),
                ("team", "internships-STDNT-INTRN"),
            ],
        )?;
        Ok(parse_search_results(&html))
    }
}

fn parse_search_results(html: &str) -> Vec<Posting> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("tr[data-job-id]").expect("static selector");
    let title_selector =
        Selector::parse("a.table--advanced-search__title").expect("static selector");
    let location_selector =
        Selector::parse("td[data-table-col-name='locations']").expect("static selector");

    let mut postings = Vec::new();
    for row in document.select(&row_selector) {
        let title_link = match row.select(&title_selector).next() {
            Some(el) => el,
            None => {
                debug!("Apple row without title link, skipping");
                continue;
            }
        };
        let href = match title_link.value().attr("href") {
            Some(href) if !href.is_empty() => href,
            _ => continue,
        };
        let location = row
            .select(&location_selector)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();

        postings.push(Posting::new(
            SourceId::Apple,
            "Apple",
            &element_text(&title_link),
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
        <table>
          <tr data-job-id="1001">
            <td><a class="table--advanced-search__title" href="/en-us/details/1001/swe-intern">
              Software Engineering Intern</a></td>
            <td data-table-col-name="locations">London, United Kingdom</td>
          </tr>
          <tr data-job-id="1002">
            <td>No link here</td>
          </tr>
        </table>"#;

    #[test]
    fn parses_rows_and_skips_broken_ones() {
        let postings = parse_search_results(FIXTURE);
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title, "Software Engineering Intern");
        assert_eq!(postings[0].location, "London, United Kingdom");
        assert_eq!(
            postings[0].url,
            "https://jobs.apple.com/en-us/details/1001/swe-intern"
        );
    }

    #[test]
    fn empty_page_yields_no_postings() {
        assert!(parse_search_results("<html><body></body></html>").is_empty());
    }
}
