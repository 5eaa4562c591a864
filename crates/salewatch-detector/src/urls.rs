//! URL resolution for checked pages and discovered sale links.

use reqwest::Url;
use salewatch_core::StoreConfig;

/// The URL a store is checked at: `url` alone, or `sale_path` resolved
/// against it.
#[must_use]
pub fn check_url(store: &StoreConfig) -> String {
    let Some(path) = store.sale_path.as_deref() else {
        return store.url.clone();
    };

    match Url::parse(&store.url).and_then(|base| base.join(path)) {
        Ok(joined) => joined.to_string(),
        Err(e) => {
            tracing::warn!(
                store = %store.name,
                url = %store.url,
                sale_path = path,
                error = %e,
                "could not resolve sale_path — checking base url instead; check config/stores.yaml"
            );
            store.url.clone()
        }
    }
}

/// Resolves an `href` against the page it was found on.
///
/// Returns `None` for fragments, `mailto:`/`tel:`/`javascript:` links and
/// anything that does not resolve to http(s). The fragment is dropped; the
/// query is kept because sale filters often live there.
pub(crate) fn resolve_href(raw: &str, base: &str) -> Option<Url> {
    let href = raw.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("mailto:") || lower.starts_with("tel:") || lower.starts_with("javascript:") {
        return None;
    }

    let mut url = if lower.starts_with("http://") || lower.starts_with("https://") {
        Url::parse(href).ok()?
    } else {
        Url::parse(base).ok()?.join(href).ok()?
    };

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_url_without_sale_path_is_url() {
        let store = StoreConfig::new("Grandpa", "https://www.grandpa.se/sale");
        assert_eq!(check_url(&store), "https://www.grandpa.se/sale");
    }

    #[test]
    fn check_url_joins_absolute_sale_path() {
        let mut store = StoreConfig::new("H&M Herr", "https://www2.hm.com/sv_se/herr.html");
        store.sale_path = Some("/sv_se/herr/rea.html".to_string());
        assert_eq!(check_url(&store), "https://www2.hm.com/sv_se/herr/rea.html");
    }

    #[test]
    fn check_url_on_bare_domain() {
        let mut store = StoreConfig::new("Footish", "https://www.footish.se");
        store.sale_path = Some("/rea".to_string());
        assert_eq!(check_url(&store), "https://www.footish.se/rea");
    }

    #[test]
    fn resolve_relative_href() {
        let url = resolve_href("/sv/rea?sort=new#top", "https://www.example.se/sv/herr").unwrap();
        assert_eq!(url.as_str(), "https://www.example.se/sv/rea?sort=new");
    }

    #[test]
    fn resolve_absolute_href_keeps_host() {
        let url = resolve_href("https://outlet.example.com/men", "https://www.example.se").unwrap();
        assert_eq!(url.as_str(), "https://outlet.example.com/men");
    }

    #[test]
    fn resolve_rejects_non_navigational_links() {
        let base = "https://www.example.se";
        assert!(resolve_href("#sale", base).is_none());
        assert!(resolve_href("mailto:sale@example.se", base).is_none());
        assert!(resolve_href("javascript:void(0)", base).is_none());
        assert!(resolve_href("   ", base).is_none());
    }
}
