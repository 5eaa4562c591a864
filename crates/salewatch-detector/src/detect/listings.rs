use salewatch_core::{SelectorList, StoreConfig};

use super::html::Document;
use super::DEFAULT_PRODUCT_SELECTORS;

/// Selectors used for structural evidence.
///
/// An absent `product_selectors` falls back to the defaults; an explicitly
/// empty list disables listing evidence for the store.
pub(crate) fn listing_selectors(store: &StoreConfig) -> Vec<SelectorList> {
    let sources: Vec<&str> = match &store.product_selectors {
        Some(list) => list.iter().map(String::as_str).collect(),
        None => DEFAULT_PRODUCT_SELECTORS.to_vec(),
    };

    sources
        .into_iter()
        .filter_map(|source| match SelectorList::parse(source) {
            Ok(selector) => Some(selector),
            Err(e) => {
                tracing::warn!(store = %store.name, error = %e, "skipping product selector");
                None
            }
        })
        .collect()
}

/// Number of elements matching any selector. Each element is counted once
/// even when several selectors match it.
pub(crate) fn count_listings(doc: &Document, selectors: &[SelectorList]) -> usize {
    doc.elements()
        .filter(|el| selectors.iter().any(|s| s.matches(&el.name, &el.attrs)))
        .count()
}
