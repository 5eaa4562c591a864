use reqwest::Url;

use super::html::Anchor;
use super::keywords::KeywordMatcher;
use crate::urls::resolve_href;

/// Path tokens that mark a link as pointing at a sale section.
const SALE_PATH_TOKENS: &[&str] = &[
    "sale", "rea", "outlet", "rabatt", "clearance", "slutrea", "mellanrea", "markdown",
];

/// First anchor that looks like a way into the sale: its text matches a sale
/// keyword or its path has a sale token segment. Returned absolute.
pub(crate) fn find_evidence_link(
    anchors: &[Anchor],
    matcher: &KeywordMatcher,
    page_url: &str,
) -> Option<String> {
    anchors.iter().find_map(|anchor| {
        let url = resolve_href(&anchor.href, page_url)?;
        (matcher.is_match(&anchor.text) || has_sale_segment(&url)).then(|| url.to_string())
    })
}

/// `true` when a path segment, or a `-`/`_`/`.` separated part of one, is a
/// sale token. `/sv_se/herr/rea.html` and `/men-sale` qualify; `/area` does not.
fn has_sale_segment(url: &Url) -> bool {
    url.path()
        .split('/')
        .flat_map(|segment| segment.split(['-', '_', '.']))
        .any(|part| {
            SALE_PATH_TOKENS
                .iter()
                .any(|token| part.eq_ignore_ascii_case(token))
        })
}
