/// Permissive numeric parsing for OCR-extracted value strings.
///
/// Accepts leading/trailing whitespace and a locale-configurable decimal
/// separator. With a decimal-point locale, commas are treated as thousands
/// separators ("1,234.5"); with a decimal-comma locale, periods are
/// ("1.234,5"). Anything that still fails stays textual upstream.
pub fn parse_numeric(raw: &str, decimal_comma: bool) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let cleaned: String = if decimal_comma {
        trimmed.chars().filter(|c| *c != '.').map(comma_to_point).collect()
    } else {
        trimmed.chars().filter(|c| *c != ',').collect()
    };

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn comma_to_point(c: char) -> char {
    if c == ',' {
        '.'
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_decimal_parses() {
        assert_eq!(parse_numeric("14.5", false), Some(14.5));
        assert_eq!(parse_numeric("140", false), Some(140.0));
    }

    #[test]
    fn surrounding_whitespace_is_accepted() {
        assert_eq!(parse_numeric("  14.5 ", false), Some(14.5));
        assert_eq!(parse_numeric("\t4.2\n", false), Some(4.2));
    }

    #[test]
    fn decimal_comma_locale() {
        assert_eq!(parse_numeric("14,5", true), Some(14.5));
        assert_eq!(parse_numeric("1.234,5", true), Some(1234.5));
    }

    #[test]
    fn thousands_commas_with_point_locale() {
        assert_eq!(parse_numeric("1,234.5", false), Some(1234.5));
    }

    #[test]
    fn signed_values_parse() {
        assert_eq!(parse_numeric("-0.5", false), Some(-0.5));
        assert_eq!(parse_numeric("+3.1", false), Some(3.1));
    }

    #[test]
    fn textual_values_do_not_parse() {
        assert_eq!(parse_numeric("negative", false), None);
        assert_eq!(parse_numeric("14.5 g/dL", false), None);
        assert_eq!(parse_numeric("", false), None);
        assert_eq!(parse_numeric("   ", false), None);
    }

    #[test]
    fn non_finite_is_rejected() {
        assert_eq!(parse_numeric("inf", false), None);
        assert_eq!(parse_numeric("NaN", false), None);
    }
}
