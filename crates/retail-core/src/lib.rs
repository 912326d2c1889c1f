//! Cleaning engine and orchestrator for the retail ETL pipeline.
//!
//! - **cleaners**: one [`DatasetCleaner`](cleaners::DatasetCleaner) per domain and their registry
//! - **boundary**: the [`Extractor`] and [`Loader`] collaborator traits
//! - **pipeline**: per-domain extract, clean and load with failure isolation

pub mod boundary;
pub mod cleaners;
pub mod error;
pub mod pipeline;

pub use boundary::{Extractor, Loader};
pub use cleaners::{CleanOutcome, CleanerRegistry, DatasetCleaner, default_registry};
pub use error::{CleanError, PipelineError};
pub use pipeline::{JobOutcome, JobReport, Pipeline, StageTimings};
