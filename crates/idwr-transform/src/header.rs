//! Column identity for two-row merged-cell workbook headers.
//!
//! Workbook sheets carry the disease name only in the first cell of a
//! merged block (row 2) and one category per column underneath (row 3).
//! Each column is labelled `"{disease}||{category}"`.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use idwr_model::{Category, PREFECTURE};

use crate::text::{clean_cell_text, contains_japanese};

/// Separator between disease and category in a resolved label.
pub const LABEL_SEPARATOR: &str = "||";

/// Disease assumed for columns before the first named block.
pub const UNKNOWN_DISEASE: &str = "Unknown";

static NUMERIC_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_[0-9]+$").expect("numeric suffix pattern"));

/// Category of one header cell. Japanese text is a footnote, not a category.
pub fn header_category(cell: Option<&str>) -> Category {
    clean_cell_text(cell)
        .filter(|text| !contains_japanese(text))
        .and_then(|text| Category::from_label(&text))
        .unwrap_or(Category::Total)
}

/// Resolve the per-column labels of a sheet.
///
/// Column 0 is always `"prefecture"`. Blank disease cells inherit the last
/// non-blank disease. Colliding labels receive `_1`, `_2`, … suffixes; those
/// columns are artifacts of repeated headers and are discarded before
/// melting (see [`is_duplicate_header_artifact`]).
pub fn resolve_headers(
    disease_row: &[Option<String>],
    category_row: &[Option<String>],
) -> Vec<String> {
    let width = disease_row.len().max(category_row.len());
    let mut headers = Vec::with_capacity(width.max(1));
    let mut seen: HashSet<String> = HashSet::with_capacity(width);
    headers.push(PREFECTURE.to_string());
    seen.insert(PREFECTURE.to_string());

    let mut current_disease = UNKNOWN_DISEASE.to_string();
    for idx in 1..width {
        let disease_cell = disease_row.get(idx).and_then(Option::as_deref);
        if let Some(disease) = clean_cell_text(disease_cell) {
            current_disease = disease;
        }
        let category = header_category(category_row.get(idx).and_then(Option::as_deref));

        let base = format!("{current_disease}{LABEL_SEPARATOR}{}", category.as_str());
        let mut label = base.clone();
        let mut suffix = 1;
        while seen.contains(&label) {
            label = format!("{base}_{suffix}");
            suffix += 1;
        }
        seen.insert(label.clone());
        headers.push(label);
    }
    headers
}

/// True for labels produced by collision suffixing.
pub fn is_duplicate_header_artifact(label: &str) -> bool {
    label.contains(LABEL_SEPARATOR) && NUMERIC_SUFFIX.is_match(label)
}

/// Split a resolved label into (disease, category).
pub fn split_header_label(label: &str) -> Option<(&str, &str)> {
    label.split_once(LABEL_SEPARATOR)
}
