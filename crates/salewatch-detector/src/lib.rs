pub mod detect;
pub mod error;
pub mod fetch;
pub mod urls;

pub use detect::{detect, DEFAULT_PRODUCT_SELECTORS, DEFAULT_SALE_KEYWORDS};
pub use error::FetchError;
pub use fetch::{HttpFetcher, PageFetcher};
pub use urls::check_url;

use salewatch_core::{SaleVerdict, StoreConfig};

/// Fetches a store's page and runs the detector on it.
///
/// A fetch failure produces an errored, inactive verdict; callers must treat
/// it as "unknown" rather than "sale over".
pub async fn check_store<F>(fetcher: &F, store: &StoreConfig) -> SaleVerdict
where
    F: PageFetcher + ?Sized,
{
    let url = check_url(store);
    match fetcher.fetch(&url).await {
        Ok(html) => detect(&html, store, &url),
        Err(e) => {
            tracing::warn!(
                store = %store.name,
                url = %url,
                error = %e,
                "fetch failed — sale status unknown"
            );
            SaleVerdict::failed(&store.name, &url, e.to_string())
        }
    }
}
