use serde::{Deserialize, Serialize};

pub const GENERIC_SALE_DESCRIPTION: &str = "Sale active";

/// The detector's conclusion about one store for one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleVerdict {
    pub store_name: String,
    pub is_active: bool,
    pub description: String,
    pub evidence_url: String,
    pub item_count: Option<usize>,
    pub discount_percent: Option<u8>,
    /// Set when the page could not be obtained. The store's status is then
    /// unknown, which is not the same as a confirmed "no sale".
    pub error: Option<String>,
}

impl SaleVerdict {
    /// Verdict for a check that never saw the page.
    #[must_use]
    pub fn failed(store_name: &str, url: &str, error: impl Into<String>) -> Self {
        Self {
            store_name: store_name.to_string(),
            is_active: false,
            description: String::new(),
            evidence_url: url.to_string(),
            item_count: None,
            discount_percent: None,
            error: Some(error.into()),
        }
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.error.is_some()
    }

    #[must_use]
    pub fn to_event(&self) -> SaleEvent {
        SaleEvent {
            store_name: self.store_name.clone(),
            description: self.description.clone(),
            url: self.evidence_url.clone(),
        }
    }
}

/// A newly detected sale, handed to notification channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleEvent {
    pub store_name: String,
    pub description: String,
    pub url: String,
}

impl SaleEvent {
    /// Synthetic event used to verify channel setup.
    #[must_use]
    pub fn test_event() -> Self {
        Self {
            store_name: "Test Store".to_string(),
            description: "This is a test notification!".to_string(),
            url: "https://example.com".to_string(),
        }
    }
}
