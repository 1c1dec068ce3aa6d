//! Accumulator for raw → canonical disease-name rewrites.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Records every disease-name rewrite observed while parsing.
///
/// Parsers take the tracker by mutable reference; callers own it and read
/// the accumulated mapping afterwards. Workers parsing in parallel each keep
/// their own tracker and combine them with [`DiseaseNameTracker::merge_from`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseNameTracker {
    mappings: BTreeMap<String, String>,
}

impl DiseaseNameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a rewrite. Identity mappings are ignored and the first
    /// canonical name seen for a raw name is kept.
    pub fn record(&mut self, raw: &str, canonical: &str) {
        if raw == canonical {
            return;
        }
        self.mappings
            .entry(raw.to_string())
            .or_insert_with(|| canonical.to_string());
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.mappings.get(raw).map(String::as_str)
    }

    pub fn mappings(&self) -> &BTreeMap<String, String> {
        &self.mappings
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Fold another tracker's mappings into this one.
    pub fn merge_from(&mut self, other: &DiseaseNameTracker) {
        for (raw, canonical) in &other.mappings {
            self.record(raw, canonical);
        }
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.mappings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_idempotent() {
        let mut tracker = DiseaseNameTracker::new();
        tracker.record("HIV/AIDS", "AIDS");
        tracker.record("HIV/AIDS", "AIDS");
        tracker.record("AIDS", "AIDS");
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.get("HIV/AIDS"), Some("AIDS"));
    }

    #[test]
    fn merge_keeps_first_mapping() {
        let mut left = DiseaseNameTracker::new();
        left.record("VRE infection", "Vancomycin-resistant Enterococcus infection");
        let mut right = DiseaseNameTracker::new();
        right.record("VRE infection", "something else");
        right.record("Tsutsugamushi disease", "Scrub typhus");
        left.merge_from(&right);
        assert_eq!(left.len(), 2);
        assert_eq!(
            left.get("VRE infection"),
            Some("Vancomycin-resistant Enterococcus infection")
        );
    }
}
