//! Tolerant tag scanner for store pages.
//!
//! Pages are never rejected: unclosed or stray tags simply contribute no
//! regions. Script, style and comment bodies are removed before scanning.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid regex"));
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid regex"));
static NOSCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<noscript\b[^>]*>.*?</noscript\s*>").expect("valid regex")
});
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(/?)([a-zA-Z][a-zA-Z0-9-]*)([^>]*)>").expect("valid regex")
});
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s="'<>/]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
        .expect("valid regex")
});
static ANY_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").expect("valid regex"));
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#([xX]?)([0-9a-fA-F]{1,6});").expect("valid regex"));

const REGION_TAGS: &[&str] = &["title", "header", "nav", "h1", "h2", "h3", "h4", "h5", "h6", "a"];
const PROMO_MARKERS: &[&str] = &["hero", "banner", "promo", "campaign", "announcement"];

#[derive(Debug, Clone)]
pub(crate) struct Tag {
    pub(crate) name: String,
    pub(crate) attrs: Vec<(String, String)>,
    closing: bool,
    self_closing: bool,
    start: usize,
    end: usize,
}

impl Tag {
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn is_promo_container(&self) -> bool {
        ["class", "id"].iter().any(|key| {
            self.attr(key).is_some_and(|value| {
                let value = value.to_lowercase();
                PROMO_MARKERS.iter().any(|marker| value.contains(marker))
            })
        })
    }
}

/// An anchor's `href` and visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Anchor {
    pub(crate) href: String,
    pub(crate) text: String,
}

pub(crate) struct Document {
    html: String,
    tags: Vec<Tag>,
}

impl Document {
    pub(crate) fn parse(raw: &str) -> Self {
        let html = sanitize(raw);
        let tags = TAG_RE
            .captures_iter(&html)
            .filter_map(|cap| {
                let whole = cap.get(0)?;
                let attr_src = cap.get(3).map_or("", |m| m.as_str());
                Some(Tag {
                    name: cap.get(2)?.as_str().to_ascii_lowercase(),
                    attrs: parse_attrs(attr_src),
                    closing: !cap.get(1).map_or("", |m| m.as_str()).is_empty(),
                    self_closing: attr_src.trim_end().ends_with('/'),
                    start: whole.start(),
                    end: whole.end(),
                })
            })
            .collect();
        Self { html, tags }
    }

    /// Opening tags in document order.
    pub(crate) fn elements(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(|t| !t.closing)
    }

    /// Text of title, header, nav, heading, anchor and promo-container
    /// elements, one region per line. Empty when none of them carry text.
    pub(crate) fn high_signal_text(&self) -> String {
        let mut regions = Vec::new();
        for (idx, tag) in self.tags.iter().enumerate() {
            if tag.closing || tag.self_closing {
                continue;
            }
            if !(REGION_TAGS.contains(&tag.name.as_str()) || tag.is_promo_container()) {
                continue;
            }
            if let Some(text) = self.inner_text(idx) {
                if !text.is_empty() {
                    regions.push(text);
                }
            }
        }
        regions.join("\n")
    }

    /// Visible text of the whole document.
    pub(crate) fn full_text(&self) -> String {
        text_of(&self.html)
    }

    pub(crate) fn anchors(&self) -> Vec<Anchor> {
        self.tags
            .iter()
            .enumerate()
            .filter(|(_, t)| t.name == "a" && !t.closing)
            .filter_map(|(idx, t)| {
                let href = t.attr("href")?.trim().to_string();
                let text = self.inner_text(idx).unwrap_or_default();
                Some(Anchor { href, text })
            })
            .collect()
    }

    /// Text between the tag at `idx` and its matching close tag. `None` when
    /// the element is never closed.
    fn inner_text(&self, idx: usize) -> Option<String> {
        let open = &self.tags[idx];
        let mut depth = 1usize;
        for tag in &self.tags[idx + 1..] {
            if tag.name != open.name || tag.self_closing {
                continue;
            }
            if tag.closing {
                depth -= 1;
                if depth == 0 {
                    return Some(text_of(&self.html[open.end..tag.start]));
                }
            } else {
                depth += 1;
            }
        }
        None
    }
}

fn sanitize(raw: &str) -> String {
    let s = COMMENT_RE.replace_all(raw, " ");
    let s = SCRIPT_RE.replace_all(&s, " ");
    let s = STYLE_RE.replace_all(&s, " ");
    NOSCRIPT_RE.replace_all(&s, " ").into_owned()
}

fn parse_attrs(src: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(src)
        .filter_map(|cap| {
            let name = cap.get(1)?.as_str().to_ascii_lowercase();
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map_or(String::new(), |m| decode_entities(m.as_str()));
            Some((name, value))
        })
        .collect()
}

fn text_of(fragment: &str) -> String {
    decode_entities(&clean_text(fragment))
}

/// Strips tags and collapses whitespace.
pub(crate) fn clean_text(input: &str) -> String {
    let no_tags = ANY_TAG_RE.replace_all(input, " ");
    no_tags.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let numeric = NUMERIC_ENTITY_RE.replace_all(input, |cap: &regex::Captures<'_>| {
        let radix = if cap[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&cap[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(|| cap[0].to_string(), |c| c.to_string())
    });
    numeric
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&aring;", "å")
        .replace("&auml;", "ä")
        .replace("&ouml;", "ö")
        .replace("&Aring;", "Å")
        .replace("&Auml;", "Ä")
        .replace("&Ouml;", "Ö")
        .replace("&amp;", "&")
}
