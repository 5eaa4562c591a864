//! Page fetching.
//!
//! [`PageFetcher`] is the seam between the detector and the network: the
//! runner only needs "give me the markup at this URL". [`HttpFetcher`] is the
//! default implementation; it does not execute JavaScript, so stores that
//! render listings client-side are judged on their server markup.

mod retry;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::Client;

use crate::error::FetchError;
use retry::retry_with_backoff;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the page body for `url`.
    ///
    /// # Errors
    ///
    /// Any [`FetchError`]; the caller degrades it to an "unknown" verdict.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP(S) GET fetcher with browser-like headers and retry on transient errors.
pub struct HttpFetcher {
    client: Client,
    /// Maximum number of retry attempts after the first failure.
    max_retries: u32,
    /// Base delay in milliseconds for exponential backoff.
    backoff_base_ms: u64,
}

impl HttpFetcher {
    /// Creates an `HttpFetcher` with configured timeout, `User-Agent`,
    /// `Accept-Language`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidHeader`] if `accept_language` is not a
    /// valid header value, or [`FetchError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        accept_language: &str,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(accept_language)
                .map_err(|e| FetchError::InvalidHeader(format!("Accept-Language: {e}")))?,
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    /// Builds a fetcher from the application config.
    ///
    /// # Errors
    ///
    /// See [`HttpFetcher::new`].
    pub fn from_config(config: &salewatch_core::AppConfig) -> Result<Self, FetchError> {
        Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            &config.accept_language,
            config.max_retries,
            config.retry_backoff_base_ms,
        )
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(FetchError::RateLimited {
                url: url.to_owned(),
                retry_after_secs,
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                url: url.to_owned(),
            });
        }

        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        tracing::debug!(url, "fetching page");
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || self.fetch_once(url)).await
    }
}
