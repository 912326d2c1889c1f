//! Domain-specific cleaning of raw retail datasets.
//!
//! Every cleaner follows the same sequence: give the dataset an `index`
//! column, check its structure, filter out rows outside the domain, coerce
//! columns to their target types, apply repairs, then shape the output.
//! Rows are filtered before any column is coerced.
//!
//! | Domain | Filter | Coercion and repair |
//! |--------|--------|---------------------|
//! | users | country allow-list | trimmed text, country code repair, dates |
//! | cards | card provider allow-list | digit-only card numbers, `MM/YY` expiry, dates |
//! | stores | exclusion list, store type allow-list | coordinates, staff number repair, dates, continent repair |
//! | products | availability (after spelling repair) | prices, weights in kg with mean imputation, codes, dates |
//! | orders | required key columns | card numbers, quantities, codes |
//! | date-events | time period allow-list | month/year/day ranges, `HH:MM:SS` timestamps |

mod cards;
mod cleaner_trait;
mod common;
mod date_events;
mod orders;
mod products;
mod stores;
mod users;

pub use cleaner_trait::{CleanerRegistry, DatasetCleaner, default_registry};
pub use common::INDEX_COLUMN;

use polars::prelude::DataFrame;
use retail_model::CleanReport;

/// A cleaned dataset with the counters collected while producing it.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub frame: DataFrame,
    pub report: CleanReport,
}
