//! Unsubscribe link extraction from HTML message bodies.
//!
//! Mailing-list footers rarely agree on markup, so matching is deliberately
//! loose: an anchor qualifies when either its visible text or its href
//! contains "unsubscribe", case-insensitively, as a plain substring. Hrefs
//! are passed through exactly as they appear in the document — no URL
//! validation or normalization — because they also serve as the dedup key
//! for the whole run.

use scraper::{Html, Selector};

/// A candidate unsubscribe link found in a message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsubscribeLink {
    /// The href exactly as it appears in the document.
    pub url: String,
    /// Trimmed visible text of the anchor.
    pub anchor_text: String,
}

const KEYWORD: &str = "unsubscribe";

/// Extracts candidate unsubscribe links from an HTML document.
///
/// Returns every matching anchor in document order, without deduplication;
/// duplicate suppression is scoped to the whole run, not one message.
/// Malformed HTML is parsed best-effort and never fails.
pub fn extract_candidate_links(html: &str) -> Vec<UnsubscribeLink> {
    let document = Html::parse_document(html);

    // The selector is static and known-good; scraper only errors on
    // invalid selector syntax.
    let anchors = Selector::parse("a[href]").expect("valid selector");

    let mut links = Vec::new();
    for anchor in document.select(&anchors) {
        let href = anchor.value().attr("href").unwrap_or("");
        if href.is_empty() {
            continue;
        }

        let text: String = anchor.text().collect();
        let text = text.trim();

        if text.to_lowercase().contains(KEYWORD) || href.to_lowercase().contains(KEYWORD) {
            links.push(UnsubscribeLink {
                url: href.to_string(),
                anchor_text: text.to_string(),
            });
        }
    }
    links
}
