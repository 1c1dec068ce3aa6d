//! Numeric coercion of bulletin cells.

use idwr_common::parse_f64;

fn strip_thousands(raw: &str) -> String {
    raw.trim().replace(',', "")
}

/// Case count of a confirmed-case or all-case cell.
///
/// Blank, non-numeric and negative cells count as zero; fractions are
/// truncated.
///
/// ```
/// use idwr_transform::numeric::coerce_count;
///
/// assert_eq!(coerce_count(Some("1,234")), 1234);
/// assert_eq!(coerce_count(Some("-")), 0);
/// assert_eq!(coerce_count(None), 0);
/// ```
pub fn coerce_count(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        return 0;
    };
    match parse_f64(&strip_thousands(raw)) {
        Some(value) if value.is_finite() && value > 0.0 => value.trunc() as i64,
        _ => 0,
    }
}

/// Value of a sentinel cell. `""` and `"-"` mean not reported.
pub fn parse_sentinel_value(raw: Option<&str>) -> Option<f64> {
    let cleaned = strip_thousands(raw?);
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    parse_f64(&cleaned).filter(|value| value.is_finite())
}

/// Sentinel count from a parsed value: rounded, never negative.
pub fn sentinel_count(value: Option<f64>) -> Option<i64> {
    value.map(|v| v.round().max(0.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn counts_are_coerced() {
        assert_eq!(coerce_count(Some("12")), 12);
        assert_eq!(coerce_count(Some(" 7 ")), 7);
        assert_eq!(coerce_count(Some("3.9")), 3);
        assert_eq!(coerce_count(Some("-4")), 0);
        assert_eq!(coerce_count(Some("")), 0);
        assert_eq!(coerce_count(Some("NaN")), 0);
        assert_eq!(coerce_count(Some("inf")), 0);
        assert_eq!(coerce_count(Some("n/a")), 0);
    }

    #[test]
    fn sentinel_values() {
        assert_eq!(parse_sentinel_value(Some("1,794")), Some(1794.0));
        assert_eq!(parse_sentinel_value(Some("8.08")), Some(8.08));
        assert_eq!(parse_sentinel_value(Some("-")), None);
        assert_eq!(parse_sentinel_value(Some(" ")), None);
        assert_eq!(parse_sentinel_value(Some("x")), None);
        assert_eq!(parse_sentinel_value(None), None);
    }

    #[test]
    fn sentinel_counts_round() {
        assert_eq!(sentinel_count(Some(2.5)), Some(3));
        assert_eq!(sentinel_count(Some(1794.0)), Some(1794));
        assert_eq!(sentinel_count(Some(-1.0)), Some(0));
        assert_eq!(sentinel_count(None), None);
    }

    proptest! {
        #[test]
        fn coerced_counts_are_never_negative(raw in ".{0,12}") {
            prop_assert!(coerce_count(Some(&raw)) >= 0);
        }

        #[test]
        fn integers_survive_coercion(n in 0i64..10_000_000) {
            prop_assert_eq!(coerce_count(Some(&n.to_string())), n);
        }
    }
}
