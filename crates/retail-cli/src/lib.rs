//! CLI library components for the retail ETL pipeline.

pub mod app;
pub mod logging;
pub mod summary;
