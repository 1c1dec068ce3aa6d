//! Parsers and the unified build for IDWR surveillance tables.
//!
//! Parsing is best-effort: files and sheets that cannot be read are logged,
//! recorded in [`ParseOutcome::skipped`] and skipped. The unified build is
//! all-or-nothing: any validation failure aborts it.

pub mod bullet;
pub mod confirmed;
pub mod dedupe;
pub mod merge;
pub mod options;
pub mod outcome;
pub mod pipeline;
pub mod registry;
pub mod sentinel;

pub use bullet::{parse_bullet, parse_bullet_grid};
pub use confirmed::{SheetPlan, SheetRejection, parse_confirmed, parse_confirmed_sheet};
pub use dedupe::{dedupe_by_key, key_columns};
pub use merge::{
    MergeReport, MergeSources, merge_stage_tables, modern_years, smart_merge,
    smart_merge_with_report,
};
pub use options::ParseOptions;
pub use outcome::{ParseOutcome, SkippedInput};
pub use pipeline::{BuildState, UnifiedBuild, UnifiedBuilder, build_unified, sort_unified};
pub use registry::{DatasetParser, ParserRegistry, parse_dataset};
pub use sentinel::{
    SentinelLayout, parse_english_grid, parse_japanese_grid, parse_sentinel, week_from_title,
};
