//! Keyword and geography filtering.
//!
//! Decides whether a posting belongs in the digest: the title must contain
//! at least one keyword (OR across the set) and the location must resolve
//! to an EU member state, the UK, or a remote role with an explicit EU/UK
//! marker. Unresolvable locations are excluded; a false exclusion is
//! preferred over a false inclusion since a human reviews the digest.

use crate::config::Config;
use crate::types::Posting;

/// Software engineering and internship role terms, OR-matched against the
/// posting title.
const DEFAULT_KEYWORDS: &[&str] = &[
    "software", "engineer", "developer", "programming", "coding", "backend", "frontend",
    "fullstack", "full-stack", "mobile", "web", "python", "java", "javascript", "react",
    "node.js", "c++", "c#", "go", "rust", "kotlin", "swift", "android", "ios",
    "machine learning", "ai", "data science", "devops", "cloud", "infrastructure",
    "tech", "technology", "it", "computer", "digital", "platform", "api", "database",
    "angular", "vue", "php", "ruby", "scala", "typescript", "sql", "docker",
    "kubernetes", "aws", "azure", "gcp", "microservices", "testing", "qa",
    "automation", "linux", "intern", "trainee", "graduate", "placement",
];

/// EU/UK city and country tokens accepted by the geography predicate.
const DEFAULT_LOCATIONS: &[&str] = &[
    "london", "dublin", "berlin", "munich", "amsterdam", "paris", "madrid", "barcelona",
    "milan", "rome", "stockholm", "copenhagen", "oslo", "helsinki", "zurich", "vienna",
    "prague", "budapest", "warsaw", "brussels", "lisbon", "athens", "bucharest", "sofia",
    "zagreb", "bratislava", "ljubljana", "tallinn", "riga", "vilnius", "luxembourg",
    "valletta", "nicosia", "uk", "united kingdom", "germany", "france", "italy", "spain",
    "netherlands", "sweden", "denmark", "norway", "finland", "switzerland", "austria",
    "belgium", "portugal", "ireland", "poland", "czech republic", "czechia", "hungary",
    "greece", "romania", "bulgaria", "croatia", "slovakia", "slovenia", "estonia",
    "latvia", "lithuania", "malta", "cyprus", "europe", "emea", "eu", "european union",
];

pub fn default_keywords() -> Vec<String> {
    DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

pub fn default_locations() -> Vec<String> {
    DEFAULT_LOCATIONS.iter().map(|s| s.to_string()).collect()
}

/// Inclusion decision for one posting. Pure and idempotent.
pub fn matches(posting: &Posting, config: &Config) -> bool {
    matches_keywords(&posting.title, &config.keyword_list)
        && matches_location(&posting.location, &config.geography_filter)
}

/// Case-insensitive substring match of the title against the keyword set.
pub fn matches_keywords(title: &str, keywords: &[String]) -> bool {
    if title.trim().is_empty() {
        return false;
    }
    let title_lower = title.to_lowercase();
    keywords
        .iter()
        .any(|k| title_lower.contains(&k.to_lowercase()))
}

/// Case-insensitive location match against the accepted token set.
///
/// Tokens of three characters or fewer ("uk", "eu") only match whole words
/// so that e.g. "Ukraine" is not accepted via "uk". Longer tokens match as
/// substrings. Empty locations never match.
pub fn matches_location(location: &str, tokens: &[String]) -> bool {
    if location.trim().is_empty() {
        return false;
    }
    let location_lower = location.to_lowercase();
    let words: Vec<&str> = location_lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    tokens.iter().any(|token| {
        let token = token.to_lowercase();
        if token.len() <= 3 {
            words.iter().any(|w| *w == token)
        } else {
            location_lower.contains(&token)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceId;

    fn posting(title: &str, location: &str) -> Posting {
        Posting::new(SourceId::Apple, "Apple", title, location, "https://example.com/j/1")
    }

    #[test]
    fn swe_intern_in_london_matches() {
        let config = Config::default();
        assert!(matches(&posting("Software Engineering Intern", "London, UK"), &config));
    }

    #[test]
    fn title_without_any_keyword_never_matches() {
        let config = Config::default();
        assert!(!matches(
            &posting("Barista, Weekend Shift", "Berlin, Germany"),
            &config
        ));
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let keywords = default_keywords();
        assert!(matches_keywords("BACKEND INTERN", &keywords));
        assert!(matches_keywords("Backend Intern", &keywords));
    }

    #[test]
    fn non_eu_location_is_excluded() {
        let tokens = default_locations();
        assert!(!matches_location("Cupertino, California", &tokens));
        assert!(!matches_location("Singapore", &tokens));
    }

    #[test]
    fn short_tokens_require_whole_word() {
        let tokens = default_locations();
        // "Ukraine" must not match via the "uk" token.
        assert!(!matches_location("Kyiv, Ukraine", &tokens));
        assert!(matches_location("Remote - UK", &tokens));
        assert!(matches_location("Remote (EMEA)", &tokens));
    }

    #[test]
    fn bare_remote_is_conservatively_excluded() {
        let tokens = default_locations();
        assert!(!matches_location("Remote", &tokens));
    }

    #[test]
    fn empty_location_is_excluded() {
        let tokens = default_locations();
        assert!(!matches_location("", &tokens));
        assert!(!matches_location("   ", &tokens));
    }

    #[test]
    fn filter_is_idempotent() {
        let config = Config::default();
        let p = posting("Backend Developer Intern", "Stockholm, Sweden");
        let first = matches(&p, &config);
        assert_eq!(first, matches(&p, &config));
        assert!(first);
    }
}
