//! Loaders for the retail ETL pipeline.
//!
//! Both replace the whole target table on every load, so re-running a job
//! leaves the same result.

pub mod csv_dir;
pub mod error;
pub mod postgres;

pub use csv_dir::{CsvDirectoryLoader, write_csv_file};
pub use error::{LoadError, Result};
pub use postgres::{PgLoader, create_table_statement, sql_type};
