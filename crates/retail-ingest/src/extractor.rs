//! The [`Extractor`] used by the pipeline: dispatches each source kind.

use std::path::Path;

use anyhow::Context;
use polars::prelude::DataFrame;
use tracing::debug;

use retail_core::Extractor;
use retail_model::{DocumentFormat, SourceDescriptor};

use crate::credentials::Credentials;
use crate::error::{IngestError, Result};
use crate::http::{HttpFetcher, parse_document};
use crate::postgres::PgSession;

/// Extracts from every supported source kind.
///
/// Database tables need a session; the CLI opens one only when some job reads
/// from the database.
pub struct SourceExtractor {
    http: HttpFetcher,
    database: Option<PgSession>,
}

impl SourceExtractor {
    pub fn new(credentials: &Credentials) -> Result<Self> {
        Ok(Self {
            http: HttpFetcher::new(&credentials.api_headers)?,
            database: None,
        })
    }

    #[must_use]
    pub fn with_database(mut self, session: PgSession) -> Self {
        self.database = Some(session);
        self
    }

    fn database(&self) -> Result<&PgSession> {
        self.database
            .as_ref()
            .ok_or(IngestError::MissingDatabase { role: "source" })
    }

    fn fetch_source(&self, source: &SourceDescriptor) -> Result<DataFrame> {
        match source {
            SourceDescriptor::DatabaseTable { table } => self.database()?.fetch_table(table),
            SourceDescriptor::RemoteDocument { url, format } => {
                self.http.fetch_document(url, *format)
            }
            SourceDescriptor::RestApi {
                count_url,
                item_url,
                count_field,
            } => self
                .http
                .fetch_api(count_url, item_url, count_field.as_deref()),
            SourceDescriptor::ObjectStorage { uri, format } => self.http.fetch_object(uri, *format),
            SourceDescriptor::LocalFile { path, format } => read_local_file(path, *format),
        }
    }
}

/// Reads a CSV or JSON file, guessing the format from the extension.
pub fn read_local_file(path: &Path, format: Option<DocumentFormat>) -> Result<DataFrame> {
    let location = path.display().to_string();
    let format = format
        .or_else(|| DocumentFormat::from_extension(&location))
        .ok_or_else(|| IngestError::UnknownFormat {
            location: location.clone(),
        })?;
    let body = std::fs::read(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(body, format, &location)
}

impl Extractor for SourceExtractor {
    fn fetch(&self, source: &SourceDescriptor) -> anyhow::Result<DataFrame> {
        debug!(kind = source.kind(), "fetching");
        self.fetch_source(source)
            .with_context(|| format!("failed to extract {source}"))
    }
}
