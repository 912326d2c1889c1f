//! Error types for extraction.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while fetching or parsing a raw dataset.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV from {origin}: {message}")]
    CsvParse { origin: String, message: String },

    #[error("failed to parse JSON from {origin}: {source}")]
    JsonParse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported JSON layout in {origin}: {message}")]
    JsonLayout { origin: String, message: String },

    #[error("cannot tell the format of {location}; set `format` on the source")]
    UnknownFormat { location: String },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("invalid header {name}")]
    InvalidHeader { name: String },

    #[error("count endpoint {url} returned no item count")]
    MissingCount { url: String },

    #[error("invalid object storage URI {uri}")]
    InvalidObjectUri { uri: String },

    #[error("failed to read credentials {path}: {message}")]
    Credentials { path: PathBuf, message: String },

    #[error("no {role} database configured")]
    MissingDatabase { role: &'static str },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("DataFrame error: {message}")]
    DataFrame { message: String },
}

impl From<PolarsError> for IngestError {
    fn from(err: PolarsError) -> Self {
        IngestError::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for extraction.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::MissingDatabase { role: "source" };
        assert_eq!(err.to_string(), "no source database configured");

        let err = IngestError::UnknownFormat {
            location: "s3://bucket/data".to_string(),
        };
        assert!(err.to_string().contains("s3://bucket/data"));
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = PolarsError::ComputeError("test error".into());
        let err: IngestError = polars_err.into();
        assert!(matches!(err, IngestError::DataFrame { .. }));
    }
}
