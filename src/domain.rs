/// Domain extraction and URL classification
use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::config::GroupingConfig;

/// Extract the grouping domain from a tab address.
///
/// Returns `None` when the address is absent, matches an ignored prefix
/// (browser-internal pages, extension pages, data/about URIs), fails to
/// parse, or has no host. Port and path are discarded; the host comes back
/// lowercased per standard URL semantics. Two tabs share a domain iff the
/// extracted hostnames are identical strings; no eTLD+1 folding.
pub fn extract_domain(url: Option<&str>, config: &GroupingConfig) -> Option<String> {
    let url = url?;
    if !is_groupable_url(Some(url), config) {
        return None;
    }

    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(|host| host.to_string())
}

/// True when the address is eligible for grouping. Shares the ignored-prefix
/// list with `extract_domain` so the two can never disagree.
pub fn is_groupable_url(url: Option<&str>, config: &GroupingConfig) -> bool {
    match url {
        Some(url) if !url.is_empty() => !config
            .ignored_url_patterns
            .iter()
            .any(|pattern| url.starts_with(pattern.as_str())),
        _ => false,
    }
}

/// Inverse of `is_groupable_url`, for readability at call sites that look
/// for placeholder/internal tabs.
pub fn is_ignored_url(url: Option<&str>, config: &GroupingConfig) -> bool {
    !is_groupable_url(url, config)
}

/// Syntactic check that a string looks like a hostname (letters, digits,
/// hyphens in label bodies, dot-separated labels of at most 63 chars).
pub fn is_valid_domain(domain: &str) -> bool {
    static DOMAIN_RE: OnceLock<Regex> = OnceLock::new();
    let re = DOMAIN_RE.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .unwrap()
    });
    !domain.is_empty() && re.is_match(domain)
}
