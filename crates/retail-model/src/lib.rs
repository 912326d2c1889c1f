//! Data model for the retail ETL workspace.
//!
//! - **domain**: the six source domains and their default target tables
//! - **rules**: allow-lists, substitution tables and unit factors used by cleaners
//! - **source**: descriptors for where a raw dataset is extracted from
//! - **config**: pipeline jobs and load target
//! - **report**: per-domain cleaning counters

pub mod config;
pub mod domain;
pub mod error;
pub mod report;
pub mod rules;
pub mod source;

pub use config::{JobConfig, LoadConfig, PipelineConfig, load_pipeline_config};
pub use domain::Domain;
pub use error::{ConfigError, Result};
pub use report::CleanReport;
pub use rules::{
    CardRules, CleaningRules, DateEventRules, DateOrder, DateRules, OrderRules, ProductRules,
    StoreRules, UnknownUnitPolicy, UserRules,
};
pub use source::{DocumentFormat, SourceDescriptor};
