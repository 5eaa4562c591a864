//! CSS-like selectors for product-listing elements.
//!
//! Only the compound subset is supported: `tag`, `.class`, `#id`, `[attr]` and
//! `[attr=value]`, chained without whitespace, with `,` separating
//! alternatives. Combinators and pseudo-classes are rejected so that a catalog
//! typo fails loudly at load time instead of silently matching nothing.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid selector \"{selector}\": {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrCondition {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

impl Compound {
    fn matches(&self, tag: &str, attrs: &[(String, String)]) -> bool {
        if let Some(expected) = &self.tag {
            if !expected.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        let attr = |name: &str| {
            attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        };

        if !self.ids.is_empty() {
            let Some(id) = attr("id") else {
                return false;
            };
            if self.ids.iter().any(|wanted| wanted != id.trim()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let class_attr = attr("class").unwrap_or_default();
            let present: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| present.contains(&c.as_str())) {
                return false;
            }
        }

        self.attrs.iter().all(|cond| match (attr(cond.name.as_str()), &cond.value) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(actual), Some(expected)) => actual == expected,
        })
    }
}

/// A comma-separated list of compound selectors. An element matches the list
/// when it matches any alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    alternatives: Vec<Compound>,
}

impl SelectorList {
    /// Parses a selector list such as `".product-card, [data-product-id]"`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectorError`] for empty alternatives, combinators,
    /// pseudo-classes, or unterminated attribute conditions.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let err = |reason: &str| SelectorError {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let mut alternatives = Vec::new();
        for part in split_alternatives(input) {
            let part = part.trim();
            if part.is_empty() {
                return Err(err("empty alternative"));
            }
            alternatives.push(parse_compound(part).map_err(|reason| err(&reason))?);
        }

        if alternatives.is_empty() {
            return Err(err("empty selector"));
        }

        Ok(Self { alternatives })
    }

    /// Returns `true` if an element with the given tag name and attributes
    /// matches any alternative.
    #[must_use]
    pub fn matches(&self, tag: &str, attrs: &[(String, String)]) -> bool {
        self.alternatives.iter().any(|c| c.matches(tag, attrs))
    }
}

/// Splits on commas that are not inside an attribute condition.
fn split_alternatives(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0u32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in input.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') if depth > 0 => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_compound(part: &str) -> Result<Compound, String> {
    let chars: Vec<char> = part.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();

    if chars.first() == Some(&'*') {
        pos = 1;
    } else if chars.first().is_some_and(|c| c.is_ascii_alphabetic()) {
        compound.tag = Some(take_ident(&chars, &mut pos).to_ascii_lowercase());
    }

    while pos < chars.len() {
        match chars[pos] {
            '.' => {
                pos += 1;
                let name = take_ident(&chars, &mut pos);
                if name.is_empty() {
                    return Err("class name expected after '.'".to_string());
                }
                compound.classes.push(name);
            }
            '#' => {
                pos += 1;
                let name = take_ident(&chars, &mut pos);
                if name.is_empty() {
                    return Err("id expected after '#'".to_string());
                }
                compound.ids.push(name);
            }
            '[' => {
                pos += 1;
                compound.attrs.push(parse_attr(&chars, &mut pos)?);
            }
            c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => {
                return Err("combinators are not supported".to_string());
            }
            ':' => return Err("pseudo-classes are not supported".to_string()),
            c => return Err(format!("unexpected character '{c}'")),
        }
    }

    if compound == Compound::default() && chars.first() != Some(&'*') {
        return Err("selector matches nothing".to_string());
    }

    Ok(compound)
}

fn parse_attr(chars: &[char], pos: &mut usize) -> Result<AttrCondition, String> {
    let skip_ws = |pos: &mut usize| {
        while *pos < chars.len() && chars[*pos].is_whitespace() {
            *pos += 1;
        }
    };

    skip_ws(pos);
    let name = take_ident(chars, pos).to_ascii_lowercase();
    if name.is_empty() {
        return Err("attribute name expected after '['".to_string());
    }
    skip_ws(pos);

    let value = match chars.get(*pos) {
        Some(']') => None,
        Some('=') => {
            *pos += 1;
            skip_ws(pos);
            let value = match chars.get(*pos) {
                Some(&q) if q == '"' || q == '\'' => {
                    *pos += 1;
                    let start = *pos;
                    while *pos < chars.len() && chars[*pos] != q {
                        *pos += 1;
                    }
                    if *pos >= chars.len() {
                        return Err("unterminated quoted attribute value".to_string());
                    }
                    let v: String = chars[start..*pos].iter().collect();
                    *pos += 1;
                    v
                }
                _ => take_ident(chars, pos),
            };
            skip_ws(pos);
            Some(value)
        }
        Some(c) => return Err(format!("unsupported attribute operator at '{c}'")),
        None => return Err("unterminated attribute condition".to_string()),
    };

    if chars.get(*pos) != Some(&']') {
        return Err("expected ']'".to_string());
    }
    *pos += 1;

    Ok(AttrCondition { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn class_selector_matches_one_of_many_classes() {
        let sel = SelectorList::parse(".product-card").unwrap();
        assert!(sel.matches("div", &attrs(&[("class", "grid product-card is-sale")])));
        assert!(!sel.matches("div", &attrs(&[("class", "product-card-wrapper")])));
    }

    #[test]
    fn class_match_is_case_sensitive() {
        let sel = SelectorList::parse(".ProductCard").unwrap();
        assert!(sel.matches("li", &attrs(&[("class", "ProductCard")])));
        assert!(!sel.matches("li", &attrs(&[("class", "productcard")])));
    }

    #[test]
    fn attribute_presence_and_value() {
        let presence = SelectorList::parse("[data-product-id]").unwrap();
        assert!(presence.matches("article", &attrs(&[("data-product-id", "123")])));
        assert!(!presence.matches("article", &attrs(&[("data-product", "123")])));

        let valued = SelectorList::parse("[data-testid='product-card']").unwrap();
        assert!(valued.matches("div", &attrs(&[("data-testid", "product-card")])));
        assert!(!valued.matches("div", &attrs(&[("data-testid", "product")])));
    }

    #[test]
    fn alternatives_are_ored() {
        let sel = SelectorList::parse(".product-grid__product, .product-grid-item, [data-productid]")
            .unwrap();
        assert!(sel.matches("li", &attrs(&[("data-productid", "9")])));
        assert!(sel.matches("li", &attrs(&[("class", "product-grid-item")])));
        assert!(!sel.matches("li", &attrs(&[("class", "footer")])));
    }

    #[test]
    fn compound_requires_every_part() {
        let sel = SelectorList::parse("li.tile#first[data-sku]").unwrap();
        assert!(sel.matches(
            "LI",
            &attrs(&[("class", "tile"), ("id", "first"), ("data-sku", "x")])
        ));
        assert!(!sel.matches("div", &attrs(&[("class", "tile"), ("id", "first"), ("data-sku", "x")])));
        assert!(!sel.matches("li", &attrs(&[("class", "tile"), ("id", "first")])));
    }

    #[test]
    fn comma_inside_quoted_value_does_not_split() {
        let sel = SelectorList::parse("[data-kind=\"a,b\"]").unwrap();
        assert!(sel.matches("div", &attrs(&[("data-kind", "a,b")])));
    }

    #[test]
    fn rejects_unsupported_syntax() {
        assert!(SelectorList::parse("div .card").is_err());
        assert!(SelectorList::parse("ul > li").is_err());
        assert!(SelectorList::parse("a:hover").is_err());
        assert!(SelectorList::parse(".a,,.b").is_err());
        assert!(SelectorList::parse("[data-x").is_err());
        assert!(SelectorList::parse("").is_err());
    }
}
