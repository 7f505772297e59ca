//! Numeric parsing and formatting helpers.

/// Formats a floating-point number without a trailing `.0`.
///
/// # Examples
///
/// ```
/// use bgt_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(100.0), "100");
/// assert_eq!(format_numeric(1.50), "1.5");
/// ```
pub fn format_numeric(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        // Avoid "-0".
        let int = v as i64;
        return int.to_string();
    }
    format!("{v}")
}

/// Parses a string as a finite `f64`, returning `None` for invalid or empty strings.
///
/// `NaN` and infinities are rejected so that textual placeholders never turn
/// into numbers.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Removes thousands separators (`,`) and, when asked, percent signs.
pub fn strip_thousands(value: &str, strip_percent: bool) -> String {
    value
        .chars()
        .filter(|ch| *ch != ',' && !(strip_percent && *ch == '%'))
        .collect()
}

/// Parses a budget amount: thousands separators and all whitespace are
/// stripped before parsing.
///
/// Unparseable input yields `None`, never zero.
///
/// # Examples
///
/// ```
/// use bgt_common::parse_amount;
///
/// assert_eq!(parse_amount("1,234.50"), Some(1234.5));
/// assert_eq!(parse_amount("N/A"), None);
/// ```
pub fn parse_amount(value: &str) -> Option<f64> {
    let compact: String = strip_thousands(value, false)
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect();
    parse_f64(&compact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(1.0), "1");
        assert_eq!(format_numeric(1.5), "1.5");
        assert_eq!(format_numeric(0.0), "0");
        assert_eq!(format_numeric(-0.0), "0");
        assert_eq!(format_numeric(-50.0), "-50");
        assert_eq!(format_numeric(1234.25), "1234.25");
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("  "), None);
        assert_eq!(parse_f64("3.25"), Some(3.25));
        assert_eq!(parse_f64("  -3.25  "), Some(-3.25));
        assert_eq!(parse_f64("invalid"), None);
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("inf"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.50"), Some(1234.5));
        assert_eq!(parse_amount(" 12 345 "), Some(12345.0));
        assert_eq!(parse_amount("-50"), Some(-50.0));
        assert_eq!(parse_amount("N/A"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount(","), None);
    }

    #[test]
    fn test_strip_thousands() {
        assert_eq!(strip_thousands("1,000%", false), "1000%");
        assert_eq!(strip_thousands("1,000%", true), "1000");
    }
}
