//! Success-marker detection in the provider's response page.
//!
//! The page is parsed as HTML and the text content of `<body>` is read the
//! way a DOM `textContent` would be: text nodes concatenated in document
//! order, tags contributing nothing. Each line of that text is trimmed and
//! compared for exact equality with the marker.

use scraper::{Html, Selector};

/// Text content of the document body.
///
/// Falls back to the whole document when no `<body>` element exists (the
/// HTML5 parser normally synthesizes one).
pub fn body_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());

    match body {
        Some(element) => element.text().collect(),
        None => document.root_element().text().collect(),
    }
}

/// Returns `true` when some trimmed line of the body text equals `pattern`.
///
/// Lines are split on `\r\n`, `\r` and `\n`.
pub fn contains_success_marker(html: &str, pattern: &str) -> bool {
    let text = body_text(html);
    let found = text
        .split(['\r', '\n'])
        .map(str::trim)
        .any(|line| line == pattern);

    tracing::trace!(bytes = html.len(), found, "success marker scan finished");
    found
}
