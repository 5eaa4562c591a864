use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::selector::SelectorList;
use crate::ConfigError;

/// Listings above this count are treated as sale evidence when a store does
/// not override it.
pub const DEFAULT_LISTING_THRESHOLD: usize = 5;

/// A sale keyword as written in the catalog.
///
/// A plain string is a whole-word, case-insensitive match. A `{ regex: ... }`
/// entry is used verbatim (case-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordPattern {
    Word(String),
    Regex { regex: String },
}

impl KeywordPattern {
    /// Regex source for this pattern.
    ///
    /// Word boundaries are only added next to word characters, so `"% off"`
    /// still matches `"50% off"` while `"sale"` does not match `"wholesale"`.
    #[must_use]
    pub fn regex_source(&self) -> String {
        match self {
            KeywordPattern::Regex { regex } => regex.clone(),
            KeywordPattern::Word(word) => {
                let word = word.trim();
                let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
                let lead = if is_word(word.chars().next()) { r"\b" } else { "" };
                let tail = if is_word(word.chars().last()) { r"\b" } else { "" };
                format!("{lead}{}{tail}", regex::escape(word))
            }
        }
    }

    /// Short human label used in verdict descriptions.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            KeywordPattern::Word(word) => word.trim(),
            KeywordPattern::Regex { .. } => "discount pattern",
        }
    }
}

impl From<&str> for KeywordPattern {
    fn from(word: &str) -> Self {
        KeywordPattern::Word(word.to_string())
    }
}

fn default_listing_threshold() -> usize {
    DEFAULT_LISTING_THRESHOLD
}

fn default_enabled() -> bool {
    true
}

/// One watched store. Stores differ only in data; a single detector consumes
/// every entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    /// Page to check, or the base the `sale_path` is resolved against.
    pub url: String,
    #[serde(default)]
    pub sale_path: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    /// `None` uses the detector defaults.
    #[serde(default)]
    pub keywords: Option<Vec<KeywordPattern>>,
    /// `None` uses the detector defaults; an empty list disables listing
    /// evidence for the store.
    #[serde(default)]
    pub product_selectors: Option<Vec<String>>,
    #[serde(default = "default_listing_threshold")]
    pub listing_threshold: usize,
    #[serde(default)]
    pub fallback_description: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl StoreConfig {
    /// Minimal enabled store with detector defaults.
    #[must_use]
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            sale_path: None,
            group: None,
            keywords: None,
            product_selectors: None,
            listing_threshold: DEFAULT_LISTING_THRESHOLD,
            fallback_description: None,
            enabled: true,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<StoreConfig>,
}

impl StoresFile {
    pub fn enabled(&self) -> impl Iterator<Item = &StoreConfig> {
        self.stores.iter().filter(|s| s.enabled)
    }
}

/// Case-insensitive lookup by store name.
#[must_use]
pub fn find_store<'a>(stores: &'a StoresFile, name: &str) -> Option<&'a StoreConfig> {
    let wanted = name.trim().to_lowercase();
    stores.stores.iter().find(|s| s.name.to_lowercase() == wanted)
}

/// Load and validate the store catalog from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let stores_file: StoresFile =
        serde_yaml::from_str(&content).map_err(ConfigError::StoresFileParse)?;

    validate_stores(&stores_file)?;

    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for store in &stores_file.stores {
        if store.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(store.name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store name: '{}'",
                store.name
            )));
        }

        if !(store.url.starts_with("http://") || store.url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "store '{}' has invalid url '{}'; must start with http:// or https://",
                store.name, store.url
            )));
        }

        if let Some(path) = &store.sale_path {
            if !path.starts_with('/') {
                return Err(ConfigError::Validation(format!(
                    "store '{}' has sale_path '{path}'; must start with '/'",
                    store.name
                )));
            }
        }

        if store.listing_threshold == 0 {
            return Err(ConfigError::Validation(format!(
                "store '{}' has listing_threshold 0; must be at least 1",
                store.name
            )));
        }

        for keyword in store.keywords.iter().flatten() {
            if keyword.label().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "store '{}' has an empty keyword",
                    store.name
                )));
            }
            if let Err(e) = regex::Regex::new(&keyword.regex_source()) {
                return Err(ConfigError::Validation(format!(
                    "store '{}' has invalid keyword pattern: {e}",
                    store.name
                )));
            }
        }

        for selector in store.product_selectors.iter().flatten() {
            if let Err(e) = SelectorList::parse(selector) {
                return Err(ConfigError::Validation(format!(
                    "store '{}': {e}",
                    store.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "stores_test.rs"]
mod tests;
