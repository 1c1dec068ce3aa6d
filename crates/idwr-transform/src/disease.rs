//! Disease-name canonicalization.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use idwr_model::DiseaseNameTracker;

/// Known raw → canonical disease names across bulletin vintages.
pub const DISEASE_NAME_MAPPINGS: &[(&str, &str)] = &[
    ("Acquired immunodeficiency syndrome (AIDS)", "AIDS"),
    ("HIV/AIDS", "AIDS"),
    (
        "Carbapenem-resistant enterobacteriaceae infection",
        "Carbapenem-resistant Enterobacterales infection",
    ),
    (
        "Enterohemorrhagic E. coli infection",
        "Enterohemorrhagic Escherichia coli infection",
    ),
    ("Epidemic louse-borne typhus", "Epidemic typhus"),
    ("Herpes B virus infection", "B virus disease"),
    ("Scrub typhus (Tsutsugamushi disease)", "Scrub typhus"),
    ("Tsutsugamushi disease", "Scrub typhus"),
    (
        "Severe invasive streptococcal infections (TSLS)",
        "Severe invasive streptococcal infections",
    ),
    ("VRE infection", "Vancomycin-resistant Enterococcus infection"),
    (
        "West Nile fever (including West Nile encephalitis)",
        "West Nile fever",
    ),
    ("Avian influenza H5N1", "Avian influenza H5N1"),
    ("Avian influenza H7N9", "Avian influenza H7N9"),
];

static MAPPINGS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| DISEASE_NAME_MAPPINGS.iter().copied().collect());

/// `<fragment>) (<rest>`: a parenthetical split across merged header cells.
static MALFORMED_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^(]*\)\s*\((.+)$").expect("malformed split pattern"));

fn repair_split_parenthetical(name: &str) -> String {
    let mut current = name.to_string();
    while let Some(rest) = MALFORMED_SPLIT
        .captures(&current)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
    {
        if rest == current {
            break;
        }
        current = rest;
    }
    current
}

/// Canonical form of a raw disease name, without tracking.
///
/// Repairs split parentheticals, then applies the synonym table.
///
/// ```
/// use idwr_transform::disease::canonical_disease_name;
///
/// assert_eq!(canonical_disease_name("H5N1) (Avian influenza H5N1"), "Avian influenza H5N1");
/// assert_eq!(canonical_disease_name("HIV/AIDS"), "AIDS");
/// assert_eq!(canonical_disease_name("Measles"), "Measles");
/// ```
pub fn canonical_disease_name(raw: &str) -> String {
    let repaired = repair_split_parenthetical(raw);
    match MAPPINGS.get(repaired.as_str()) {
        Some(mapped) => (*mapped).to_string(),
        None => repaired,
    }
}

/// Canonicalize a disease name and record the rewrite in `tracker`.
pub fn normalize_disease_name(raw: &str, tracker: &mut DiseaseNameTracker) -> String {
    let canonical = canonical_disease_name(raw);
    if canonical != raw {
        tracing::trace!(raw, canonical = %canonical, "normalized disease name");
        tracker.record(raw, &canonical);
    }
    canonical
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn malformed_parenthetical_is_repaired() {
        let mut tracker = DiseaseNameTracker::new();
        assert_eq!(
            normalize_disease_name("H5N1) (Avian influenza H5N1", &mut tracker),
            "Avian influenza H5N1"
        );
        assert_eq!(
            tracker.get("H5N1) (Avian influenza H5N1"),
            Some("Avian influenza H5N1")
        );
    }

    #[test]
    fn synonyms_are_mapped_and_tracked_once() {
        let mut tracker = DiseaseNameTracker::new();
        for _ in 0..3 {
            assert_eq!(
                normalize_disease_name("Tsutsugamushi disease", &mut tracker),
                "Scrub typhus"
            );
        }
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn unchanged_names_are_not_tracked() {
        let mut tracker = DiseaseNameTracker::new();
        assert_eq!(normalize_disease_name("Measles", &mut tracker), "Measles");
        assert_eq!(
            normalize_disease_name("Avian influenza H7N9", &mut tracker),
            "Avian influenza H7N9"
        );
        assert!(tracker.is_empty());
    }

    #[test]
    fn every_table_entry_is_a_fixed_point_after_mapping() {
        for (raw, canonical) in DISEASE_NAME_MAPPINGS {
            assert_eq!(canonical_disease_name(raw), *canonical);
            assert_eq!(canonical_disease_name(canonical), *canonical);
        }
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(raw in ".{0,40}") {
            let once = canonical_disease_name(&raw);
            let twice = canonical_disease_name(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn nested_fragments_are_idempotent(a in "[a-z ]{0,6}", b in "[a-z ]{1,6}", c in "[a-z]{1,6}") {
            let raw = format!("{a}) ({b}) ({c}");
            let once = canonical_disease_name(&raw);
            prop_assert_eq!(canonical_disease_name(&once), once);
        }
    }
}
