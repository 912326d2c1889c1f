//! JSON documents into all-string DataFrames.
//!
//! Two layouts are understood:
//! - a record array: `[{"a": 1, "b": "x"}, ...]`
//! - a column-oriented object keyed by row label: `{"a": {"0": 1, "1": 2}, ...}`
//!
//! Scalars become their text form and `null` stays missing.

use std::collections::{BTreeMap, HashSet};

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use serde_json::{Map, Value};

use crate::error::{IngestError, Result};

/// Accumulates rows with a growing set of columns.
#[derive(Debug, Default)]
pub struct RecordTable {
    columns: Vec<String>,
    positions: BTreeMap<String, usize>,
    cells: Vec<Vec<Option<String>>>,
    rows: usize,
}

impl RecordTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one JSON object as a row.
    pub fn push(&mut self, record: &Map<String, Value>) {
        for (name, value) in record {
            let position = match self.positions.get(name) {
                Some(&position) => position,
                None => {
                    let position = self.columns.len();
                    self.columns.push(name.clone());
                    self.positions.insert(name.clone(), position);
                    self.cells.push(vec![None; self.rows]);
                    position
                }
            };
            self.cells[position].push(scalar_text(value));
        }
        self.rows += 1;
        for column in &mut self.cells {
            column.resize(self.rows, None);
        }
    }

    pub fn into_frame(self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .into_iter()
            .zip(self.cells)
            .map(|(name, values)| Series::new(name.into(), values).into_column())
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

/// Text form of a JSON scalar; nested values keep their JSON text.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Parses JSON bytes in either supported layout.
pub fn read_json_bytes(bytes: &[u8], origin: &str) -> Result<DataFrame> {
    let value: Value = serde_json::from_slice(bytes).map_err(|source| IngestError::JsonParse {
        origin: origin.to_string(),
        source,
    })?;
    json_to_frame(&value, origin)
}

/// Converts an already-parsed document.
pub fn json_to_frame(value: &Value, origin: &str) -> Result<DataFrame> {
    let layout_error = |message: &str| IngestError::JsonLayout {
        origin: origin.to_string(),
        message: message.to_string(),
    };

    match value {
        Value::Array(items) => {
            let mut table = RecordTable::new();
            for item in items {
                let record = item
                    .as_object()
                    .ok_or_else(|| layout_error("array items must be objects"))?;
                table.push(record);
            }
            table.into_frame()
        }
        Value::Object(columns) => {
            let mut labels: Vec<&String> = Vec::new();
            let mut seen = HashSet::new();
            for column in columns.values() {
                let cells = column
                    .as_object()
                    .ok_or_else(|| layout_error("columns must map row labels to values"))?;
                for label in cells.keys() {
                    if seen.insert(label) {
                        labels.push(label);
                    }
                }
            }
            if labels.iter().all(|label| label.parse::<u64>().is_ok()) {
                labels.sort_by_key(|label| label.parse::<u64>().unwrap_or(u64::MAX));
            }

            let frame_columns: Vec<Column> = columns
                .iter()
                .map(|(name, column)| {
                    let values: Vec<Option<String>> = labels
                        .iter()
                        .map(|label| column.get(label.as_str()).and_then(scalar_text))
                        .collect();
                    Series::new(name.as_str().into(), values).into_column()
                })
                .collect();
            Ok(DataFrame::new(frame_columns)?)
        }
        _ => Err(layout_error("expected an array or an object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use retail_common::optional_string_column;

    fn text(df: &DataFrame, column: &str, row: usize) -> Option<String> {
        optional_string_column(df, column).unwrap().swap_remove(row)
    }

    #[test]
    fn record_array_with_uneven_keys() {
        let df = read_json_bytes(
            br#"[{"store_code": "WEB-1388012W", "staff_numbers": 325},
                 {"staff_numbers": null, "lat": "N/A"}]"#,
            "inline",
        )
        .unwrap();
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(text(&df, "staff_numbers", 0).as_deref(), Some("325"));
        assert_eq!(text(&df, "staff_numbers", 1), None);
        assert_eq!(text(&df, "store_code", 1), None);
        assert_eq!(text(&df, "lat", 1).as_deref(), Some("N/A"));
    }

    #[test]
    fn column_oriented_object_orders_rows_numerically() {
        let df = read_json_bytes(
            br#"{"timestamp": {"0": "22:00:06", "10": "09:00:00", "2": "17:05:11"},
                 "month": {"0": "9", "2": "2", "10": "5"}}"#,
            "date_details.json",
        )
        .unwrap();
        assert_eq!(df.shape(), (3, 2));
        assert_eq!(text(&df, "timestamp", 1).as_deref(), Some("17:05:11"));
        assert_eq!(text(&df, "month", 2).as_deref(), Some("5"));
    }

    #[test]
    fn scalar_document_is_rejected() {
        let err = read_json_bytes(b"42", "inline").unwrap_err();
        assert!(matches!(err, IngestError::JsonLayout { .. }));
    }

    #[test]
    fn malformed_json_reports_origin() {
        let err = read_json_bytes(b"{", "s3://bucket/x.json").unwrap_err();
        assert!(err.to_string().contains("s3://bucket/x.json"));
    }
}
