//! Column read/write helpers for Polars `DataFrame`s.
//!
//! Cleaners work column-at-a-time: read a column into a `Vec`, transform the
//! values, then write a new typed column back under the same name.

use chrono::NaiveDate;
use polars::prelude::{
    AnyValue, BooleanChunked, DataFrame, DataType, NamedFrom, NewChunkedArray, PolarsResult,
    Series,
};

use crate::polars::{any_to_string, days_from_date};

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Returns the column names in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Maps every cell of a column through `f`, in row order.
pub fn cell_values<T>(
    df: &DataFrame,
    name: &str,
    mut f: impl FnMut(AnyValue<'_>) -> T,
) -> PolarsResult<Vec<T>> {
    let column = df.column(name)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(f(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

/// Reads a column as trimmed strings; nulls become empty strings.
pub fn string_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    cell_values(df, name, |value| any_to_string(value).trim().to_string())
}

/// Reads a column as trimmed strings, keeping nulls as `None`.
///
/// Blank strings are kept as `Some("")` so callers can tell a missing cell
/// from an empty one.
pub fn optional_string_column(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    cell_values(df, name, |value| match value {
        AnyValue::Null => None,
        other => Some(any_to_string(other).trim().to_string()),
    })
}

pub fn set_string_column(df: &mut DataFrame, name: &str, values: Vec<String>) -> PolarsResult<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

pub fn set_optional_string_column(
    df: &mut DataFrame,
    name: &str,
    values: Vec<Option<String>>,
) -> PolarsResult<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

pub fn set_f64_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> PolarsResult<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

pub fn set_i64_column(df: &mut DataFrame, name: &str, values: Vec<Option<i64>>) -> PolarsResult<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

pub fn set_u64_column(df: &mut DataFrame, name: &str, values: Vec<Option<u64>>) -> PolarsResult<()> {
    let series = Series::new(name.into(), values);
    df.with_column(series)?;
    Ok(())
}

/// Writes a `Date` column (stored physically as days since 1970-01-01).
pub fn set_date_column(
    df: &mut DataFrame,
    name: &str,
    values: Vec<Option<NaiveDate>>,
) -> PolarsResult<()> {
    let days: Vec<Option<i32>> = values
        .into_iter()
        .map(|value| value.map(days_from_date))
        .collect();
    let series = Series::new(name.into(), days).cast(&DataType::Date)?;
    df.with_column(series)?;
    Ok(())
}

/// Keeps the rows whose mask entry is `true`.
pub fn filter_rows(df: &mut DataFrame, keep: &[bool]) -> PolarsResult<()> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    *df = df.filter(&mask)?;
    Ok(())
}

/// Drops each named column that exists; returns the names actually dropped.
pub fn drop_columns_if_present<S: AsRef<str>>(
    df: &mut DataFrame,
    names: &[S],
) -> PolarsResult<Vec<String>> {
    let mut dropped = Vec::new();
    for name in names {
        let name = name.as_ref();
        if has_column(df, name) {
            *df = df.drop(name)?;
            dropped.push(name.to_string());
        }
    }
    Ok(dropped)
}

/// Renames `from` to `to` when `from` exists and `to` does not.
///
/// Returns whether a rename happened, so repeated runs stay no-ops.
pub fn rename_column(df: &mut DataFrame, from: &str, to: &str) -> PolarsResult<bool> {
    if from == to || !has_column(df, from) || has_column(df, to) {
        return Ok(false);
    }
    df.rename(from, to.into())?;
    Ok(true)
}

/// Adds a 0-based Int64 row identifier column at position 0 when missing.
///
/// Returns `true` when the column was added.
pub fn ensure_index_column(df: &mut DataFrame, name: &str) -> PolarsResult<bool> {
    if has_column(df, name) {
        return Ok(false);
    }
    let height = i64::try_from(df.height()).unwrap_or(i64::MAX);
    let series = Series::new(name.into(), (0..height).collect::<Vec<i64>>());
    df.insert_column(0, series)?;
    Ok(true)
}
