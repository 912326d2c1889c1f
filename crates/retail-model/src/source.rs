//! Descriptors for where a raw dataset comes from.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Encoding of a document fetched from a URL or file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    #[default]
    Csv,
    Json,
}

impl DocumentFormat {
    /// Guesses the format from a path or URL suffix.
    pub fn from_extension(location: &str) -> Option<Self> {
        let lower = location.to_ascii_lowercase();
        let lower = lower.split(['?', '#']).next().unwrap_or_default();
        if lower.ends_with(".csv") {
            Some(Self::Csv)
        } else if lower.ends_with(".json") {
            Some(Self::Json)
        } else {
            None
        }
    }
}

/// One raw data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", deny_unknown_fields)]
pub enum SourceDescriptor {
    /// A table in the source relational database.
    DatabaseTable { table: String },
    /// A CSV or JSON document behind a URL.
    RemoteDocument {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<DocumentFormat>,
    },
    /// A paged REST endpoint: a count endpoint followed by one request per item.
    ///
    /// `item_url` contains an `{index}` placeholder replaced by 0..count.
    RestApi {
        count_url: String,
        item_url: String,
        /// JSON field holding the item count; the first numeric field when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        count_field: Option<String>,
    },
    /// An object-storage URI such as `s3://bucket/key.csv`.
    ObjectStorage {
        uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<DocumentFormat>,
    },
    /// A CSV or JSON file on the local filesystem.
    LocalFile {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<DocumentFormat>,
    },
}

impl SourceDescriptor {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DatabaseTable { .. } => "database-table",
            Self::RemoteDocument { .. } => "remote-document",
            Self::RestApi { .. } => "rest-api",
            Self::ObjectStorage { .. } => "object-storage",
            Self::LocalFile { .. } => "local-file",
        }
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatabaseTable { table } => write!(f, "table {table}"),
            Self::RemoteDocument { url, .. } => write!(f, "document {url}"),
            Self::RestApi { item_url, .. } => write!(f, "api {item_url}"),
            Self::ObjectStorage { uri, .. } => write!(f, "object {uri}"),
            Self::LocalFile { path, .. } => write!(f, "file {}", path.display()),
        }
    }
}
