//! Retailer detection from product URLs.

/// Known retailers, matched against the URL host in order.
const KNOWN_STORES: [(&str, &str); 6] = [
    ("amazon.", "Amazon"),
    ("bestbuy.", "Best Buy"),
    ("walmart.", "Walmart"),
    ("target.", "Target"),
    ("newegg.", "Newegg"),
    ("ebay.", "eBay"),
];

/// Store name for anything not in the known list.
pub const OTHER_STORE: &str = "Other";

/// Derives the retailer name from a product URL, case-insensitively.
///
/// This is the only place the retailer list lives; product creation and
/// the display helpers both call it.
pub fn extract_store_name(url: &str) -> &'static str {
    let host = host_of(url).to_lowercase();
    KNOWN_STORES
        .iter()
        .find(|(needle, _)| host.contains(needle))
        .map(|(_, name)| *name)
        .unwrap_or(OTHER_STORE)
}

/// Title used when the caller does not supply one.
pub fn default_title(store_name: &str) -> String {
    format!("{} Product", store_name)
}

fn host_of(url: &str) -> &str {
    let url = url.trim();
    let rest = match url.find("://") {
        Some(idx) => &url[idx + 3..],
        None => url,
    };
    let end = rest
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let authority = &rest[..end];
    authority.rsplit('@').next().unwrap_or(authority)
}
