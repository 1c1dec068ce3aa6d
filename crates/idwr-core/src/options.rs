use std::collections::BTreeSet;

use crate::sentinel::SentinelLayout;

/// Per-call parser settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Overrides the year inferred from file names or bulletin text.
    pub year: Option<i32>,
    /// Restricts CSV inputs to these filename-derived weeks.
    pub weeks: Option<BTreeSet<i32>>,
    /// Forces a sentinel layout instead of detecting it per file.
    pub sentinel_layout: Option<SentinelLayout>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_weeks(mut self, weeks: impl IntoIterator<Item = i32>) -> Self {
        self.weeks = Some(weeks.into_iter().collect());
        self
    }

    pub fn with_sentinel_layout(mut self, layout: SentinelLayout) -> Self {
        self.sentinel_layout = Some(layout);
        self
    }

    /// True when `week` passes the week filter. Unknown weeks pass only
    /// when there is no filter.
    pub fn accepts_week(&self, week: Option<i32>) -> bool {
        match (&self.weeks, week) {
            (None, _) => true,
            (Some(weeks), Some(week)) => weeks.contains(&week),
            (Some(_), None) => false,
        }
    }
}
