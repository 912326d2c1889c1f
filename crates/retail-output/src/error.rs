//! Error types for loading.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use retail_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid table name {table:?}")]
    InvalidTable { table: String },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {table} as CSV: {source}")]
    Csv {
        table: String,
        #[source]
        source: PolarsError,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Session(#[from] IngestError),
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// Table names double as file names, so they are restricted to
/// ASCII letters, digits, `_` and `-`.
pub fn validate_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if valid {
        Ok(())
    } else {
        Err(LoadError::InvalidTable {
            table: table.to_string(),
        })
    }
}
