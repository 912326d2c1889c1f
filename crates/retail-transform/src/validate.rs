//! Row validators.
//!
//! A validator restricts a dataset to the rows that belong to its domain.
//! Rejected rows are dropped, never quarantined; every `retain_*` function
//! returns how many rows it removed so callers can report them.

use std::collections::HashSet;

use polars::prelude::{DataFrame, PolarsResult};
use retail_common::{any_to_i64, cell_values, filter_rows, optional_string_column};

/// Exact-match set of permitted categorical values.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    values: HashSet<String>,
}

impl AllowList {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            values: values
                .into_iter()
                .map(|value| value.as_ref().trim().to_string())
                .collect(),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value.trim())
    }
}

/// `true` for each value present in the allow-list. Nulls are never allowed.
pub fn allowed_mask(values: &[Option<String>], allow: &AllowList) -> Vec<bool> {
    values
        .iter()
        .map(|value| value.as_deref().is_some_and(|v| allow.contains(v)))
        .collect()
}

/// `true` for each row whose every column value is present and non-blank.
pub fn complete_mask(columns: &[Vec<Option<String>>], height: usize) -> Vec<bool> {
    (0..height)
        .map(|row| {
            columns.iter().all(|column| {
                column
                    .get(row)
                    .and_then(Option::as_deref)
                    .is_some_and(|v| !v.trim().is_empty())
            })
        })
        .collect()
}

/// Keeps rows whose `column` value is in `allow`.
pub fn retain_allowed(df: &mut DataFrame, column: &str, allow: &AllowList) -> PolarsResult<usize> {
    let values = optional_string_column(df, column)?;
    let keep = allowed_mask(&values, allow);
    retain(df, &keep)
}

/// Drops rows whose `index_column` value is listed in `excluded`.
pub fn retain_not_excluded(
    df: &mut DataFrame,
    index_column: &str,
    excluded: &[i64],
) -> PolarsResult<usize> {
    if excluded.is_empty() {
        return Ok(0);
    }
    let excluded: HashSet<i64> = excluded.iter().copied().collect();
    let keep = cell_values(df, index_column, |value| {
        any_to_i64(value).is_none_or(|idx| !excluded.contains(&idx))
    })?;
    retain(df, &keep)
}

/// Drops rows with a null or blank value in any of `columns`.
pub fn retain_complete<S: AsRef<str>>(df: &mut DataFrame, columns: &[S]) -> PolarsResult<usize> {
    let values = columns
        .iter()
        .map(|column| optional_string_column(df, column.as_ref()))
        .collect::<PolarsResult<Vec<_>>>()?;
    let keep = complete_mask(&values, df.height());
    retain(df, &keep)
}

fn retain(df: &mut DataFrame, keep: &[bool]) -> PolarsResult<usize> {
    let rejected = keep.iter().filter(|kept| !**kept).count();
    if rejected > 0 {
        filter_rows(df, keep)?;
    }
    Ok(rejected)
}
