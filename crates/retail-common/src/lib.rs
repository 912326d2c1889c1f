//! Shared utilities for the retail ETL crates.
//!
//! This crate provides common utilities used across the workspace:
//! Polars `AnyValue` conversions, column read/write helpers for
//! `DataFrame`s, and log redaction for personal data.

pub mod frame;
pub mod polars;
pub mod redact;

// Re-export commonly used functions at crate root for convenience
pub use crate::frame::{
    cell_values, column_names, drop_columns_if_present, ensure_index_column, filter_rows,
    has_column, optional_string_column, rename_column, set_date_column, set_f64_column,
    set_i64_column, set_optional_string_column, set_string_column, set_u64_column,
    string_column,
};
pub use crate::polars::{
    any_to_date, any_to_f64, any_to_i64, any_to_string, date_from_days, days_from_date,
    format_numeric, parse_f64, parse_i64,
};
pub use crate::redact::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data};
