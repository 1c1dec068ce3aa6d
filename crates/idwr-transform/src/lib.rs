//! Cleaning and reshaping of raw bulletin cells into canonical records.
//!
//! - [`text`]: bilingual cell cleaning and full-width normalization
//! - [`disease`]: disease-name canonicalization with a rewrite tracker
//! - [`header`]: two-row merged header resolution for workbook sheets
//! - [`numeric`] and [`datetime`]: count coercion and ISO week dates
//! - [`frame_builder`] and [`wide`]: typed stage frames and reshaping

pub mod datetime;
pub mod disease;
pub mod frame_builder;
pub mod header;
pub mod numeric;
pub mod text;
pub mod wide;

pub use datetime::{iso_week_monday, iso_week_sunday};
pub use disease::{DISEASE_NAME_MAPPINGS, canonical_disease_name, normalize_disease_name};
pub use frame_builder::{
    align_to_columns, build_stage_frame, column_dtype, concat_aligned, date_column,
    empty_stage_frame, records_from_frame, retain_rows, union_columns,
};
pub use header::{is_duplicate_header_artifact, resolve_headers, split_header_label};
pub use numeric::{coerce_count, parse_sentinel_value, sentinel_count};
pub use text::{
    clean_bullet_column_name, clean_cell_text, clean_label_text, contains_japanese,
    normalize_fullwidth,
};
pub use wide::{melt_long, pivot_wide};
