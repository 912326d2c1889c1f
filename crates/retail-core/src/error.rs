use polars::prelude::PolarsError;
use retail_model::Domain;
use thiserror::Error;

/// Structural defects that stop a dataset from being cleaned.
///
/// Bad cells and out-of-domain rows are not errors; they are recovered and
/// counted in the clean report.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("{domain}: missing expected column '{column}'")]
    MissingColumn { domain: Domain, column: String },

    #[error("{domain}: dataset has no rows")]
    EmptyDataset { domain: Domain },

    #[error("no cleaner registered for domain {0}")]
    Unregistered(Domain),

    #[error("dataframe operation failed: {0}")]
    Frame(#[from] PolarsError),
}

/// Failure of one domain job, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{domain}: extract failed: {cause:#}")]
    Extract { domain: Domain, cause: anyhow::Error },

    #[error("{domain}: clean failed: {source}")]
    Clean {
        domain: Domain,
        #[source]
        source: CleanError,
    },

    #[error("{domain}: load into {table} failed: {cause:#}")]
    Load {
        domain: Domain,
        table: String,
        cause: anyhow::Error,
    },

    #[error("{domain}: worker thread panicked")]
    Worker { domain: Domain },
}

impl PipelineError {
    pub fn domain(&self) -> Domain {
        match self {
            Self::Extract { domain, .. }
            | Self::Clean { domain, .. }
            | Self::Load { domain, .. }
            | Self::Worker { domain } => *domain,
        }
    }

    /// Name of the stage that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Extract { .. } => "extract",
            Self::Clean { .. } => "clean",
            Self::Load { .. } => "load",
            Self::Worker { .. } => "worker",
        }
    }
}
