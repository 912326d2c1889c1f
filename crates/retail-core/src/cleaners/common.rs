//! Cleaning steps shared by the domain cleaners.
//!
//! A [`Cleaning`] owns the working copy of a dataset and its report. Each step
//! rewrites whole columns and records what it dropped, nulled or repaired.
//! Coercion and repair steps fail with [`CleanError::MissingColumn`] when their
//! column is absent; only trimming skips absent columns.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame};
use tracing::{debug, warn};

use retail_common::{
    any_to_date, any_to_f64, any_to_i64, any_to_string, cell_values, drop_columns_if_present,
    ensure_index_column, filter_rows, has_column, optional_string_column, redact_value, set_date_column,
    set_f64_column, set_i64_column, set_optional_string_column, set_u64_column,
};
use retail_model::{CleanReport, DateOrder, Domain};
use retail_transform::coerce::{card_digits, parse_date, repair_value, uppercase_code};
use retail_transform::{AllowList, retain_allowed, retain_complete, retain_not_excluded};

use crate::cleaners::CleanOutcome;
use crate::error::CleanError;

/// Row identifier column carried by every dataset.
pub const INDEX_COLUMN: &str = "index";

pub(super) struct Cleaning {
    pub(super) df: DataFrame,
    pub(super) report: CleanReport,
    domain: Domain,
}

impl Cleaning {
    /// Copies the raw dataset and gives it an Int64 `index` column.
    pub(super) fn start(domain: Domain, raw: &DataFrame) -> Result<Self, CleanError> {
        if raw.height() == 0 {
            return Err(CleanError::EmptyDataset { domain });
        }
        let mut df = raw.clone();
        if !ensure_index_column(&mut df, INDEX_COLUMN)? {
            let index = cell_values(&df, INDEX_COLUMN, any_to_i64)?;
            set_i64_column(&mut df, INDEX_COLUMN, index)?;
        }
        let report = CleanReport::new(domain, df.height());
        Ok(Self { df, report, domain })
    }

    pub(super) fn require<S: AsRef<str>>(&self, columns: &[S]) -> Result<(), CleanError> {
        for column in columns {
            let column = column.as_ref();
            if !has_column(&self.df, column) {
                return Err(CleanError::MissingColumn {
                    domain: self.domain,
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    pub(super) fn has(&self, column: &str) -> bool {
        has_column(&self.df, column)
    }

    pub(super) fn drop_columns<S: AsRef<str>>(&mut self, columns: &[S]) -> Result<(), CleanError> {
        let dropped = drop_columns_if_present(&mut self.df, columns)?;
        if !dropped.is_empty() {
            debug!(domain = %self.domain, columns = ?dropped, "Dropped columns");
        }
        Ok(())
    }

    /// Drops rows whose `column` value is not in `allowed`.
    pub(super) fn filter_allowed(
        &mut self,
        column: &str,
        allowed: &[String],
    ) -> Result<(), CleanError> {
        let allow = AllowList::new(allowed);
        let rejected = retain_allowed(&mut self.df, column, &allow)?;
        self.rejected(column, rejected);
        Ok(())
    }

    pub(super) fn exclude_indices(&mut self, excluded: &[i64]) -> Result<(), CleanError> {
        let rejected = retain_not_excluded(&mut self.df, INDEX_COLUMN, excluded)?;
        self.rejected("excluded_index", rejected);
        Ok(())
    }

    /// Drops rows with a null or blank value in any of `columns`.
    pub(super) fn require_values<S: AsRef<str>>(
        &mut self,
        columns: &[S],
        reason: &str,
    ) -> Result<(), CleanError> {
        self.require(columns)?;
        let rejected = retain_complete(&mut self.df, columns)?;
        self.rejected(reason, rejected);
        Ok(())
    }

    fn rejected(&mut self, reason: &str, count: usize) {
        if count > 0 {
            debug!(domain = %self.domain, reason, count, "Rejected rows");
            self.report.record_rejected(reason, count);
        }
    }

    fn nulled(&mut self, column: &str, count: usize, example: Option<&str>) {
        if count > 0 {
            debug!(
                domain = %self.domain,
                column,
                count,
                example = example.map(redact_value),
                "Unreadable values set to null"
            );
            self.report.record_nulled(column, count);
        }
    }

    /// Trims every existing column in `columns`, keeping nulls.
    pub(super) fn trim_strings<S: AsRef<str>>(&mut self, columns: &[S]) -> Result<(), CleanError> {
        for column in columns {
            let column = column.as_ref();
            if !self.has(column) {
                continue;
            }
            let values = optional_string_column(&self.df, column)?;
            set_optional_string_column(&mut self.df, column, values)?;
        }
        Ok(())
    }

    /// Replaces values found in `repairs`.
    pub(super) fn repair_values(
        &mut self,
        column: &str,
        repairs: &BTreeMap<String, String>,
    ) -> Result<(), CleanError> {
        self.map_strings(column, |value| repair_value(value, repairs))
    }

    pub(super) fn uppercase(&mut self, column: &str) -> Result<(), CleanError> {
        self.map_strings(column, uppercase_code)
    }

    fn map_strings(
        &mut self,
        column: &str,
        mut f: impl FnMut(&mut String) -> bool,
    ) -> Result<(), CleanError> {
        self.require(&[column])?;
        let mut values = optional_string_column(&self.df, column)?;
        let changed = values
            .iter_mut()
            .flatten()
            .map(|value| f(value))
            .filter(|changed| *changed)
            .count();
        set_optional_string_column(&mut self.df, column, values)?;
        if changed > 0 {
            debug!(domain = %self.domain, column, changed, "Repaired values");
            self.report.record_repaired(column, changed);
        }
        Ok(())
    }

    /// Converts each of `columns` to a `Date` column.
    pub(super) fn dates<S: AsRef<str>>(
        &mut self,
        columns: &[S],
        order: DateOrder,
    ) -> Result<(), CleanError> {
        for column in columns {
            let column = column.as_ref();
            self.require(&[column])?;
            let values = cell_values(&self.df, column, |value| date_cell(value, order))?;
            self.write_coerced(column, values, |df, name, parsed| {
                set_date_column(df, name, parsed)
            })?;
        }
        Ok(())
    }

    /// Converts each of `columns` to `Float64`.
    pub(super) fn floats<S: AsRef<str>>(&mut self, columns: &[S]) -> Result<(), CleanError> {
        for column in columns {
            let column = column.as_ref();
            self.require(&[column])?;
            let values = cell_values(&self.df, column, |value| coerce_cell(value, any_to_f64))?;
            self.write_coerced(column, values, set_f64_column)?;
        }
        Ok(())
    }

    /// Converts `column` to `Int64` with `parse`, nulling what it cannot read.
    pub(super) fn integers(
        &mut self,
        column: &str,
        mut parse: impl FnMut(&str) -> Option<i64>,
    ) -> Result<(), CleanError> {
        self.require(&[column])?;
        let values = cell_values(&self.df, column, |value| {
            coerce_cell(value, |raw| parse(&any_to_string(raw)))
        })?;
        self.write_coerced(column, values, set_i64_column)
    }

    /// Converts `column` to digit-only `UInt64` card numbers.
    pub(super) fn card_numbers(&mut self, column: &str, placeholders: &str) -> Result<(), CleanError> {
        self.require(&[column])?;
        let values = cell_values(&self.df, column, |value| match value {
            AnyValue::UInt64(v) => Coerced::Value(v),
            other => coerce_cell(other, |raw| card_digits(&any_to_string(raw), placeholders)),
        })?;
        self.write_coerced(column, values, set_u64_column)
    }

    /// Rewrites `column` as text through `f`, nulling values it rejects.
    pub(super) fn text(
        &mut self,
        column: &str,
        f: impl Fn(&str) -> Option<String>,
    ) -> Result<(), CleanError> {
        self.require(&[column])?;
        let values = cell_values(&self.df, column, |value| {
            coerce_cell(value, |raw| f(any_to_string(raw).trim()))
        })?;
        self.write_coerced(column, values, set_optional_string_column)
    }

    /// Drops rows whose `column` is null after coercion.
    pub(super) fn drop_null(&mut self, column: &str, reason: &str) -> Result<(), CleanError> {
        let keep = cell_values(&self.df, column, |value| !matches!(value, AnyValue::Null))?;
        let rejected = keep.iter().filter(|kept| !**kept).count();
        if rejected > 0 {
            filter_rows(&mut self.df, &keep)?;
        }
        self.rejected(reason, rejected);
        Ok(())
    }

    pub(super) fn write_coerced<T>(
        &mut self,
        column: &str,
        values: Vec<Coerced<T>>,
        write: impl FnOnce(&mut DataFrame, &str, Vec<Option<T>>) -> polars::prelude::PolarsResult<()>,
    ) -> Result<(), CleanError> {
        let mut nulled = 0;
        let mut example = None;
        let typed: Vec<Option<T>> = values
            .into_iter()
            .map(|value| match value {
                Coerced::Value(v) => Some(v),
                Coerced::Missing => None,
                Coerced::Invalid(raw) => {
                    nulled += 1;
                    example.get_or_insert(raw);
                    None
                }
            })
            .collect();
        write(&mut self.df, column, typed)?;
        self.nulled(column, nulled, example.as_deref());
        Ok(())
    }

    pub(super) fn domain(&self) -> Domain {
        self.domain
    }

    pub(super) fn finish(mut self) -> CleanOutcome {
        self.report.rows_out = self.df.height();
        debug!(
            domain = %self.domain,
            rows_in = self.report.rows_in,
            rows_out = self.report.rows_out,
            rejected = self.report.total_rejected(),
            nulled = self.report.total_nulled(),
            "Cleaned dataset"
        );
        CleanOutcome {
            frame: self.df,
            report: self.report,
        }
    }
}

/// One coerced cell: a typed value, an empty cell, or an unreadable raw value.
pub(super) enum Coerced<T> {
    Value(T),
    Missing,
    Invalid(String),
}

/// Applies `parse` to a non-empty cell, keeping the raw text when it fails.
pub(super) fn coerce_cell<T>(
    value: AnyValue<'_>,
    parse: impl FnOnce(AnyValue<'_>) -> Option<T>,
) -> Coerced<T> {
    let raw = any_to_string(value.clone());
    if raw.trim().is_empty() {
        return Coerced::Missing;
    }
    match parse(value) {
        Some(parsed) => Coerced::Value(parsed),
        None => Coerced::Invalid(raw),
    }
}

fn date_cell(value: AnyValue<'_>, order: DateOrder) -> Coerced<NaiveDate> {
    if let Some(date) = any_to_date(value.clone()) {
        return Coerced::Value(date);
    }
    coerce_cell(value, |raw| parse_date(&any_to_string(raw), order))
}

/// Emits one warning for `count` problem cells in `column`.
pub(super) fn warn_unreadable(domain: Domain, column: &str, count: usize, detail: &str) {
    if count > 0 {
        warn!(domain = %domain, column, count, "{detail}");
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

    /// Builds an all-string frame; `None` cells are nulls.
    pub(crate) fn test_df(columns: Vec<(&str, Vec<Option<&str>>)>) -> DataFrame {
        let cols: Vec<Column> = columns
            .into_iter()
            .map(|(name, values)| {
                Series::new(
                    name.into(),
                    values
                        .iter()
                        .map(|value| value.map(String::from))
                        .collect::<Vec<_>>(),
                )
                .into_column()
            })
            .collect();
        DataFrame::new(cols).unwrap()
    }
}
