//! Year and week inference from bulletin file names.
//!
//! Bulletins are published under names such as `2024-01-zensu.csv`,
//! `zensu01.csv`, `teitenrui04.csv` or `2015Syu_01_1.xls`. These helpers
//! are the fallback when the caller does not supply year/week explicitly.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(19|20)\d{2}").expect("year pattern"));
static DASHED_WEEK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d{2})(?:\D|$)").expect("dashed week pattern"));
static PREFIXED_WEEK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:zensu|teiten(?:rui)?)(\d{2})").expect("prefixed week pattern")
});
static SENTINEL_STEM_WEEK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)teiten(?:rui)?(\d{2})").expect("sentinel week pattern"));

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// First four-digit 19xx/20xx run in the file name.
pub fn infer_year(path: &Path) -> Option<i32> {
    YEAR.find(file_name(path))
        .and_then(|m| m.as_str().parse().ok())
}

/// Week number from a `-NN` segment, or from a `zensuNN`/`teitenNN` stem.
pub fn infer_week(path: &Path) -> Option<i32> {
    let name = file_name(path);
    DASHED_WEEK
        .captures(name)
        .or_else(|| PREFIXED_WEEK.captures(name))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Year and week inferred together; either may be missing.
pub fn infer_year_week(path: &Path) -> (Option<i32>, Option<i32>) {
    (infer_year(path), infer_week(path))
}

/// Week from a sentinel file stem (`teitenNN` / `teitenruiNN`).
pub fn infer_sentinel_stem_week(path: &Path) -> Option<i32> {
    let stem = path.file_stem().and_then(|s| s.to_str())?;
    SENTINEL_STEM_WEEK
        .captures(stem)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn p(name: &str) -> PathBuf {
        PathBuf::from("/cache/bullet").join(name)
    }

    #[test]
    fn test_infer_year() {
        assert_eq!(infer_year(&p("2015Syu_01_1.xls")), Some(2015));
        assert_eq!(infer_year(&p("1999Syu_01_1.xls")), Some(1999));
        assert_eq!(infer_year(&p("zensu01.csv")), None);
    }

    #[test]
    fn test_infer_week() {
        assert_eq!(infer_week(&p("2024-01-zensu.csv")), Some(1));
        assert_eq!(infer_week(&p("2025-04-teiten.csv")), Some(4));
        assert_eq!(infer_week(&p("zensu12.csv")), Some(12));
        assert_eq!(infer_week(&p("teitenrui04.csv")), Some(4));
        assert_eq!(infer_week(&p("bulletin.csv")), None);
    }

    #[test]
    fn test_dashed_week_ignores_year_digits() {
        assert_eq!(infer_week(&p("zensu-2024-03.csv")), Some(3));
    }

    #[test]
    fn test_infer_year_week() {
        assert_eq!(infer_year_week(&p("2024-52-zensu.csv")), (Some(2024), Some(52)));
    }

    #[test]
    fn test_sentinel_stem_week() {
        assert_eq!(infer_sentinel_stem_week(&p("teitenrui04.csv")), Some(4));
        assert_eq!(infer_sentinel_stem_week(&p("Teiten07.csv")), Some(7));
        assert_eq!(infer_sentinel_stem_week(&p("2024-01-zensu.csv")), None);
    }
}
