//! Sale detection heuristic.
//!
//! A page is judged on two kinds of evidence:
//!
//! - **Keywords** in high-signal regions (title, header, nav, headings,
//!   links, hero/banner/promo containers), matched on word boundaries.
//! - **Listings**: more product elements than the store's
//!   `listing_threshold`, counted with the store's selectors.
//!
//! Either one makes the verdict active. Advertised percentages ("upp till
//! 50%") only shape the description; they never activate a page on their own.

mod discount;
mod html;
mod keywords;
mod links;
mod listings;

use salewatch_core::verdict::GENERIC_SALE_DESCRIPTION;
use salewatch_core::{SaleVerdict, StoreConfig};

use discount::extract_max_discount;
use html::Document;
use keywords::KeywordMatcher;
use links::find_evidence_link;
use listings::{count_listings, listing_selectors};

/// Keywords used when a store does not configure its own.
pub const DEFAULT_SALE_KEYWORDS: &[&str] = &[
    "rea",
    "slutrea",
    "mellanrea",
    "rabatt",
    "prisnedsättning",
    "kampanj",
    "erbjudande",
    "sale",
    "clearance",
    "outlet",
    "markdown",
    "% off",
    "% rabatt",
];

/// Product-listing selectors used when a store does not configure its own.
pub const DEFAULT_PRODUCT_SELECTORS: &[&str] = &[
    ".product-card",
    ".product-item",
    ".product-tile",
    ".product",
    "[data-testid='product']",
    "[data-product-id]",
];

const NO_SALE_DESCRIPTION: &str = "No sale detected";
const MAX_LISTED_KEYWORDS: usize = 3;

/// Analyses one fetched page for `store`.
///
/// `page_url` is the URL the markup came from; relative links are resolved
/// against it and it is the evidence URL when no better link is found.
/// Malformed markup is never an error, it just yields less evidence.
#[must_use]
pub fn detect(html: &str, store: &StoreConfig, page_url: &str) -> SaleVerdict {
    let doc = Document::parse(html);
    let matcher = KeywordMatcher::for_store(store);

    let mut signal_text = doc.high_signal_text();
    if signal_text.trim().is_empty() {
        signal_text = doc.full_text();
    }
    let matched = matcher.matched_labels(&signal_text);

    let discount_percent = extract_max_discount(&doc.full_text());

    let selectors = listing_selectors(store);
    let item_count = (!selectors.is_empty()).then(|| count_listings(&doc, &selectors));
    let listing_evidence = item_count.is_some_and(|n| n > store.listing_threshold);

    let is_active = !matched.is_empty() || listing_evidence;

    let description = if !is_active {
        NO_SALE_DESCRIPTION.to_string()
    } else if let Some(pct) = discount_percent {
        format!("Up to {pct}% off")
    } else if !matched.is_empty() {
        let listed: Vec<&str> = matched
            .iter()
            .take(MAX_LISTED_KEYWORDS)
            .map(String::as_str)
            .collect();
        format!("{GENERIC_SALE_DESCRIPTION} ({})", listed.join(", "))
    } else {
        store
            .fallback_description
            .clone()
            .unwrap_or_else(|| GENERIC_SALE_DESCRIPTION.to_string())
    };

    let evidence_url = if is_active {
        find_evidence_link(&doc.anchors(), &matcher, page_url)
            .unwrap_or_else(|| page_url.to_string())
    } else {
        page_url.to_string()
    };

    tracing::debug!(
        store = %store.name,
        is_active,
        keywords = ?matched,
        item_count,
        discount_percent,
        "page analysed"
    );

    SaleVerdict {
        store_name: store.name.clone(),
        is_active,
        description,
        evidence_url,
        item_count,
        discount_percent,
        error: None,
    }
}

#[cfg(test)]
#[path = "detect_test.rs"]
mod tests;
