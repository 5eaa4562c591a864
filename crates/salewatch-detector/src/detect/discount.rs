use std::ops::RangeInclusive;
use std::sync::LazyLock;

use regex::Regex;

/// Percentages outside this range are treated as noise (stock levels,
/// "100% cotton", interest rates).
const PLAUSIBLE_DISCOUNT: RangeInclusive<u32> = 5..=90;

static UP_TO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:up\s+to|upp\s+till|bis\s+zu)\s*-?\s*(\d{1,3})\s*%").expect("valid regex")
});
static TRAILING_CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^\d.,])(\d{1,3})\s*%\s*(?:off|rabatt|av|discount)\b")
        .expect("valid regex")
});
static LEADING_MINUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\w\-\u{2212}\u{2013}])[-\u{2212}\u{2013}]\s?(\d{1,3})\s*%")
        .expect("valid regex")
});

/// Largest plausible advertised discount in `text`.
///
/// Only percentages with sale context count: "up to 50%", "upp till 50%",
/// "50% off", "30 % rabatt", "20% av", or a leading minus as in "-30%".
/// A bare "40%" or a range such as "10-30%" is ignored.
pub(crate) fn extract_max_discount(text: &str) -> Option<u8> {
    [&*UP_TO_RE, &*TRAILING_CONTEXT_RE, &*LEADING_MINUS_RE]
        .into_iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|cap| cap.get(1)?.as_str().parse::<u32>().ok())
        .filter(|n| PLAUSIBLE_DISCOUNT.contains(n))
        .max()
        .and_then(|n| u8::try_from(n).ok())
}
