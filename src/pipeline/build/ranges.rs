use std::sync::LazyLock;

use regex::Regex;

use super::values::parse_numeric;
use crate::models::ReferenceRange;

static INTERVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?[\d.,]+)\s*[-–—]\s*([+-]?[\d.,]+)\s*$").expect("valid regex")
});

static BOUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([<>])\s*=?\s*([+-]?[\d.,]+)\s*$").expect("valid regex"));

/// Parse a raw reference-range string.
///
/// Recognized forms: "LOW-HIGH" (also en/em dash), "<HIGH", ">LOW"
/// (an optional "=" after the comparator is tolerated). Anything else,
/// including numeric fragments that fail the locale parse, is kept as
/// free text, which interprets as Unknown.
pub fn parse_range(raw: &str, decimal_comma: bool) -> ReferenceRange {
    let text = || ReferenceRange::Text { text: raw.trim().to_string() };

    if let Some(caps) = INTERVAL_RE.captures(raw) {
        let low = parse_numeric(&caps[1], decimal_comma);
        let high = parse_numeric(&caps[2], decimal_comma);
        return match (low, high) {
            (Some(low), Some(high)) if low <= high => ReferenceRange::Interval { low, high },
            _ => text(),
        };
    }

    if let Some(caps) = BOUND_RE.captures(raw) {
        if let Some(bound) = parse_numeric(&caps[2], decimal_comma) {
            return match &caps[1] {
                "<" => ReferenceRange::LessThan { high: bound },
                _ => ReferenceRange::GreaterThan { low: bound },
            };
        }
        return text();
    }

    text()
}
