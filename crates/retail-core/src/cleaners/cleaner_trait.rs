//! Dataset cleaner trait and registry.
//!
//! Each domain has one [`DatasetCleaner`]. The [`CleanerRegistry`] maps a
//! [`Domain`] to its cleaner so the pipeline picks the cleaner from the job
//! configuration instead of branching on the domain itself.
//!
//! # Example
//!
//! ```ignore
//! use retail_core::cleaners::default_registry;
//!
//! let cleaner = default_registry().get(Domain::Stores)?;
//! let outcome = cleaner.clean(&raw, &rules)?;
//! ```

use std::collections::BTreeMap;
use std::sync::OnceLock;

use polars::prelude::DataFrame;
use retail_model::{CleaningRules, Domain};

use super::CleanOutcome;
use crate::error::CleanError;

/// Per-domain cleaning capability.
///
/// A cleaner is a pure function of its input dataset and rules: it never
/// performs I/O, and it never mutates the raw dataset it is given.
pub trait DatasetCleaner: Send + Sync {
    /// The domain this cleaner handles.
    fn domain(&self) -> Domain;

    fn description(&self) -> &'static str {
        self.domain().description()
    }

    /// Produces the clean dataset and its report.
    ///
    /// # Errors
    ///
    /// Returns a [`CleanError`] for structural defects only: a missing
    /// expected column or an empty dataset. Bad rows and cells are dropped or
    /// nulled and counted in the report.
    fn clean(&self, raw: &DataFrame, rules: &CleaningRules) -> Result<CleanOutcome, CleanError>;
}

/// Registry of dataset cleaners indexed by domain.
///
/// The registry is read-only once built and can be shared across threads.
#[derive(Default)]
pub struct CleanerRegistry {
    cleaners: BTreeMap<Domain, Box<dyn DatasetCleaner>>,
}

impl CleanerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cleaner for its domain, replacing any previous one.
    pub fn register(&mut self, cleaner: Box<dyn DatasetCleaner>) {
        self.cleaners.insert(cleaner.domain(), cleaner);
    }

    pub fn get(&self, domain: Domain) -> Result<&dyn DatasetCleaner, CleanError> {
        self.cleaners
            .get(&domain)
            .map(AsRef::as_ref)
            .ok_or(CleanError::Unregistered(domain))
    }

    pub fn len(&self) -> usize {
        self.cleaners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cleaners.is_empty()
    }

    /// Registered cleaners in domain order.
    pub fn cleaners(&self) -> impl Iterator<Item = &dyn DatasetCleaner> + '_ {
        self.cleaners.values().map(AsRef::as_ref)
    }
}

static DEFAULT_REGISTRY: OnceLock<CleanerRegistry> = OnceLock::new();

/// Returns the registry with a cleaner for every [`Domain`].
pub fn default_registry() -> &'static CleanerRegistry {
    DEFAULT_REGISTRY.get_or_init(build_default_registry)
}

fn build_default_registry() -> CleanerRegistry {
    let mut registry = CleanerRegistry::new();
    registry.register(Box::new(FunctionCleaner::new(
        Domain::Users,
        super::users::clean_users,
    )));
    registry.register(Box::new(FunctionCleaner::new(
        Domain::Cards,
        super::cards::clean_cards,
    )));
    registry.register(Box::new(FunctionCleaner::new(
        Domain::Stores,
        super::stores::clean_stores,
    )));
    registry.register(Box::new(FunctionCleaner::new(
        Domain::Products,
        super::products::clean_products,
    )));
    registry.register(Box::new(FunctionCleaner::new(
        Domain::Orders,
        super::orders::clean_orders,
    )));
    registry.register(Box::new(FunctionCleaner::new(
        Domain::DateEvents,
        super::date_events::clean_date_events,
    )));
    registry
}

type CleanFn = fn(&DataFrame, &CleaningRules) -> Result<CleanOutcome, CleanError>;

/// Adapts a cleaning function to the [`DatasetCleaner`] trait.
struct FunctionCleaner {
    domain: Domain,
    clean_fn: CleanFn,
}

impl FunctionCleaner {
    fn new(domain: Domain, clean_fn: CleanFn) -> Self {
        Self { domain, clean_fn }
    }
}

impl DatasetCleaner for FunctionCleaner {
    fn domain(&self) -> Domain {
        self.domain
    }

    fn clean(&self, raw: &DataFrame, rules: &CleaningRules) -> Result<CleanOutcome, CleanError> {
        (self.clean_fn)(raw, rules)
    }
}
