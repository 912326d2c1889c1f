//! Collaborators that move datasets in and out of the pipeline.
//!
//! The cleaners never touch these; the orchestrator calls them around each
//! cleaning step. Implementations live in `retail-ingest` and `retail-output`.

use polars::prelude::DataFrame;
use retail_model::SourceDescriptor;

/// Produces a raw dataset for a source.
///
/// Failures (network, authentication, parse) are returned as-is; the pipeline
/// does not retry.
pub trait Extractor: Send + Sync {
    fn fetch(&self, source: &SourceDescriptor) -> anyhow::Result<DataFrame>;
}

/// Persists a clean dataset under a table name, replacing any previous content.
pub trait Loader: Send + Sync {
    fn load(&self, frame: &DataFrame, table: &str) -> anyhow::Result<()>;

    /// Short label for logs and summaries.
    fn describe(&self) -> String {
        "loader".to_string()
    }
}
