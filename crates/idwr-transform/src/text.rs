//! Cell text cleaning for bilingual bulletin headers and labels.
//!
//! Legacy workbooks mix Japanese and English in one cell ("北海道 (Hokkaido)"),
//! use full-width ASCII, and the 1999–2000 files contain stray NUL bytes.

use std::sync::LazyLock;

use regex::Regex;

static PARENTHESIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[（(]([^)）]+)[)）]").expect("parenthesized segment pattern"));
static POSITIONAL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\.\.[0-9]+$").expect("positional column pattern"));

/// Maps full-width ASCII (U+FF01–U+FF5E) to half-width and the ideographic
/// space to an ASCII space. Other characters pass through.
pub fn normalize_fullwidth(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '\u{3000}' => ' ',
            '\u{FF01}'..='\u{FF5E}' => {
                char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch)
            }
            other => other,
        })
        .collect()
}

/// True if the text contains hiragana, katakana or CJK ideographs.
pub fn contains_japanese(text: &str) -> bool {
    text.chars().any(|ch| {
        matches!(ch,
            '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{4E00}'..='\u{9FFF}')
    })
}

/// Cleans one cell of a bulletin header or label column.
///
/// When the cell holds parenthesized segments the last one is returned,
/// which is where the English name of a bilingual cell lives. Returns `None`
/// for null or blank cells.
///
/// ```
/// use idwr_transform::text::clean_cell_text;
///
/// assert_eq!(clean_cell_text(Some("北海道 (Hokkaido)")).as_deref(), Some("Hokkaido"));
/// assert_eq!(clean_cell_text(Some("  Total  ")).as_deref(), Some("Total"));
/// assert_eq!(clean_cell_text(Some("")), None);
/// ```
pub fn clean_cell_text(text: Option<&str>) -> Option<String> {
    let clean = strip_control(text?);
    let result = match PARENTHESIZED.captures_iter(&clean).last() {
        Some(caps) => normalize_fullwidth(caps[1].trim()),
        None => normalize_fullwidth(&clean),
    };
    non_blank(&result)
}

/// Cleans a cell that already holds a single-language label.
///
/// Same control-byte and full-width handling as [`clean_cell_text`], but
/// parenthesized qualifiers stay part of the label.
///
/// ```
/// use idwr_transform::text::clean_label_text;
///
/// assert_eq!(
///     clean_label_text(Some(" Infectious gastroenteritis (only rotavirus) ")).as_deref(),
///     Some("Infectious gastroenteritis (only rotavirus)")
/// );
/// assert_eq!(clean_label_text(Some(" ")), None);
/// ```
pub fn clean_label_text(text: Option<&str>) -> Option<String> {
    non_blank(&normalize_fullwidth(&strip_control(text?)))
}

fn strip_control(text: &str) -> String {
    text.chars()
        .filter(|&ch| ch != '\0')
        .map(|ch| if matches!(ch, '\r' | '\n' | '\t') { ' ' } else { ch })
        .collect()
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Everything after the first line break run, or the whole name when it
/// has a single line.
fn without_first_line(raw: &str) -> &str {
    match raw.find(['\r', '\n']) {
        Some(pos) => raw[pos..].trim_start_matches(['\r', '\n']),
        None => raw,
    }
}

/// Cleans a column name from the all-case bulletin header row.
///
/// Drops the first line of multi-line names, drops Excel's positional
/// `...N` names, normalizes full-width characters and whitespace, and
/// unwraps a name that is entirely enclosed in one pair of parentheses.
pub fn clean_bullet_column_name(raw: &str) -> Option<String> {
    let rest = without_first_line(raw);
    if POSITIONAL_NAME.is_match(rest.trim()) {
        return None;
    }
    let normalized = normalize_fullwidth(rest);
    let mut name = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.starts_with('(') && name.ends_with(')') && name.matches('(').count() == 1 {
        name = name[1..name.len() - 1].trim().to_string();
    }
    if name.is_empty() { None } else { Some(name) }
}
