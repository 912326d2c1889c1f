//! Extraction for the retail ETL pipeline.
//!
//! - **csv** / **document**: CSV and JSON bodies into all-string DataFrames
//! - **http**: remote documents, object storage and paged REST endpoints
//! - **postgres**: a blocking PostgreSQL session (table copy-out, table listing)
//! - **credentials**: the YAML credentials bundle
//! - **extractor**: [`SourceExtractor`], the pipeline's extractor

pub mod credentials;
pub mod csv;
pub mod document;
pub mod error;
pub mod extractor;
pub mod http;
pub mod postgres;

pub use credentials::{Credentials, DatabaseCredentials};
pub use csv::{read_csv_bytes, read_csv_file};
pub use document::{json_to_frame, read_json_bytes};
pub use error::{IngestError, Result};
pub use extractor::{SourceExtractor, read_local_file};
pub use http::{HttpFetcher, object_url};
pub use postgres::{PgSession, quote_ident};
