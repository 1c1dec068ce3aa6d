//! Shared utilities for IDWR crates.
//!
//! This crate provides common utilities used across the workspace,
//! including Polars `AnyValue` conversions and column accessors.

pub mod frame;
pub mod polars;

// Re-export commonly used functions at crate root for convenience
pub use frame::{column_date, column_f64, column_i64, column_string, column_value_string, has_column};
pub use polars::{
    any_to_date, any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty, format_numeric,
    parse_f64, parse_i64,
};
