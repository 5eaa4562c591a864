use regex::{Regex, RegexBuilder};
use salewatch_core::{KeywordPattern, StoreConfig};

use super::DEFAULT_SALE_KEYWORDS;

/// Compiled, case-insensitive sale keyword patterns for one store.
pub(crate) struct KeywordMatcher {
    patterns: Vec<(String, Regex)>,
}

impl KeywordMatcher {
    /// Uses the store's keywords, or the default Swedish/English list when
    /// the store configures none.
    pub(crate) fn for_store(store: &StoreConfig) -> Self {
        let owned;
        let patterns: &[KeywordPattern] = if let Some(keywords) = &store.keywords {
            keywords
        } else {
            owned = DEFAULT_SALE_KEYWORDS
                .iter()
                .map(|k| KeywordPattern::from(*k))
                .collect::<Vec<_>>();
            &owned
        };
        Self::compile(&store.name, patterns)
    }

    fn compile(store_name: &str, patterns: &[KeywordPattern]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|pattern| {
                match RegexBuilder::new(&pattern.regex_source())
                    .case_insensitive(true)
                    .build()
                {
                    Ok(re) => Some((pattern.label().to_string(), re)),
                    Err(e) => {
                        tracing::warn!(
                            store = store_name,
                            pattern = pattern.label(),
                            error = %e,
                            "skipping invalid keyword pattern"
                        );
                        None
                    }
                }
            })
            .collect();
        Self { patterns }
    }

    /// Labels of the patterns found in `text`, in configuration order,
    /// without duplicates.
    pub(crate) fn matched_labels(&self, text: &str) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for (label, re) in &self.patterns {
            if re.is_match(text) && !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        labels
    }

    pub(crate) fn is_match(&self, text: &str) -> bool {
        self.patterns.iter().any(|(_, re)| re.is_match(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_matcher() -> KeywordMatcher {
        KeywordMatcher::for_store(&StoreConfig::new("Any", "https://example.se"))
    }

    #[test]
    fn wholesale_does_not_match_sale() {
        let m = default_matcher();
        assert!(!m.is_match("For wholesale inquiries, contact us"));
        assert!(m.matched_labels("For wholesale inquiries").is_empty());
    }

    #[test]
    fn matches_swedish_and_english_case_insensitively() {
        let m = default_matcher();
        assert_eq!(m.matched_labels("MELLANREA nu"), vec!["mellanrea"]);
        assert_eq!(m.matched_labels("Summer Sale"), vec!["sale"]);
        assert!(m.is_match("Prisnedsättning på jackor"));
    }

    #[test]
    fn labels_follow_configuration_order_without_duplicates() {
        let mut store = StoreConfig::new("Custom", "https://example.se");
        store.keywords = Some(vec![
            KeywordPattern::from("outlet"),
            KeywordPattern::from("rea"),
            KeywordPattern::Regex {
                regex: r"\d+\s*%".to_string(),
            },
        ]);
        let m = KeywordMatcher::for_store(&store);
        let labels = m.matched_labels("REA rea REA 30 % i vår outlet");
        assert_eq!(labels, vec!["outlet", "rea", "discount pattern"]);
    }

    #[test]
    fn invalid_regex_is_skipped() {
        let mut store = StoreConfig::new("Broken", "https://example.se");
        store.keywords = Some(vec![
            KeywordPattern::Regex {
                regex: "(unclosed".to_string(),
            },
            KeywordPattern::from("rea"),
        ]);
        let m = KeywordMatcher::for_store(&store);
        assert!(m.is_match("Stor rea"));
        assert_eq!(m.patterns.len(), 1);
    }

    #[test]
    fn empty_keyword_list_matches_nothing() {
        let mut store = StoreConfig::new("Quiet", "https://example.se");
        store.keywords = Some(Vec::new());
        assert!(!KeywordMatcher::for_store(&store).is_match("SALE SALE SALE"));
    }
}
