//! URL normalization and deduplication.
//!
//! Two layers: duplicates within a single run (the same posting surfacing
//! from two sources, or twice from one source) are collapsed before
//! filtering; postings already notified in an earlier run are suppressed
//! against the seen-store. Both use the same normalized-URL key.

use std::collections::HashSet;

use crate::errors::MonitorError;
use crate::seen_store::SeenStore;
use crate::types::Posting;

/// Tracking parameters stripped from URLs before comparison.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source", "utm_medium", "utm_campaign", "utm_term", "utm_content", "utm_id",
    "gclid", "gclsrc",         // Google Ads
    "fbclid",                  // Facebook
    "msclkid",                 // Microsoft/Bing
    "mc_cid", "mc_eid",        // Mailchimp
    "ref", "referrer",
    "sessionid", "session_id",
    "_ga", "_gl",
];

/// Normalize a URL into the dedup key.
///
/// Rules: lowercase scheme and hostname, drop the fragment, drop tracking
/// query parameters, sort the remaining parameters, strip the trailing
/// slash on non-root paths. Strings without a scheme are returned trimmed
/// and unchanged.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || !url.contains("://") {
        return url.to_string();
    }

    let (scheme, rest) = match url.find("://") {
        Some(pos) => (url[..pos].to_lowercase(), &url[pos + 3..]),
        None => return url.to_string(),
    };

    let (host_port, path_query) = match rest.find('/') {
        Some(pos) => (&rest[..pos], &rest[pos..]),
        None => (rest, "/"),
    };
    let host_port = host_port.to_lowercase();

    let (path, query) = match path_query.find('?') {
        Some(pos) => (&path_query[..pos], Some(&path_query[pos + 1..])),
        None => (path_query, None),
    };

    // Drop fragment from either part.
    let path = path.split('#').next().unwrap_or(path);
    let query = query.map(|q| q.split('#').next().unwrap_or(q));

    let path = if path.len() > 1 && path.ends_with('/') {
        &path[..path.len() - 1]
    } else if path.is_empty() {
        "/"
    } else {
        path
    };

    let normalized_query = query.and_then(|q| {
        let mut params: Vec<(String, String)> = q
            .split('&')
            .filter_map(|param| {
                let mut parts = param.splitn(2, '=');
                let key = parts.next()?.to_lowercase();
                if key.is_empty() || TRACKING_PARAMS.contains(&key.as_str()) {
                    return None;
                }
                Some((key, parts.next().unwrap_or("").to_string()))
            })
            .collect();
        if params.is_empty() {
            return None;
        }
        params.sort_by(|a, b| a.0.cmp(&b.0));
        Some(
            params
                .iter()
                .map(|(k, v)| {
                    if v.is_empty() {
                        k.clone()
                    } else {
                        format!("{}={}", k, v)
                    }
                })
                .collect::<Vec<_>>()
                .join("&"),
        )
    });

    match normalized_query {
        Some(q) => format!("{}://{}{}?{}", scheme, host_port, path, q),
        None => format!("{}://{}{}", scheme, host_port, path),
    }
}

/// The dedup key for a posting.
pub fn dedup_key(posting: &Posting) -> String {
    normalize_url(&posting.url)
}

/// Collapse duplicate postings within one run.
///
/// First occurrence wins, so collector order determines which source a
/// cross-source duplicate is attributed to. Postings with an empty URL are
/// dropped, they cannot be keyed or linked in the digest.
pub fn collapse_in_run(postings: Vec<Posting>) -> Vec<Posting> {
    let mut seen_keys: HashSet<String> = HashSet::new();
    postings
        .into_iter()
        .filter(|p| {
            let key = dedup_key(p);
            if key.is_empty() {
                return false;
            }
            seen_keys.insert(key)
        })
        .collect()
}

/// Retain only postings whose key is absent from the seen-store.
///
/// The store is not modified here; novel postings are marked seen by the
/// run controller only after the digest is delivered.
pub fn novel_against_store(
    postings: Vec<Posting>,
    store: &SeenStore,
) -> Result<Vec<Posting>, MonitorError> {
    let mut novel = Vec::with_capacity(postings.len());
    for posting in postings {
        if !store.contains(&dedup_key(&posting))? {
            novel.push(posting);
        }
    }
    Ok(novel)
}
