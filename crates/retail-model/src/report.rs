//! Counters collected while cleaning one dataset.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::Domain;

/// Row and cell accounting for one cleaned dataset.
///
/// Rejections are keyed by reason (for example `country`), nulled cells and
/// repairs by column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub domain: Domain,
    pub rows_in: usize,
    pub rows_out: usize,
    pub rejected: BTreeMap<String, usize>,
    pub nulled: BTreeMap<String, usize>,
    pub repaired: BTreeMap<String, usize>,
    pub imputed: BTreeMap<String, usize>,
}

impl CleanReport {
    pub fn new(domain: Domain, rows_in: usize) -> Self {
        Self {
            domain,
            rows_in,
            rows_out: rows_in,
            rejected: BTreeMap::new(),
            nulled: BTreeMap::new(),
            repaired: BTreeMap::new(),
            imputed: BTreeMap::new(),
        }
    }

    pub fn record_rejected(&mut self, reason: &str, count: usize) {
        bump(&mut self.rejected, reason, count);
    }

    pub fn record_nulled(&mut self, column: &str, count: usize) {
        bump(&mut self.nulled, column, count);
    }

    pub fn record_repaired(&mut self, column: &str, count: usize) {
        bump(&mut self.repaired, column, count);
    }

    pub fn record_imputed(&mut self, column: &str, count: usize) {
        bump(&mut self.imputed, column, count);
    }

    pub fn total_rejected(&self) -> usize {
        self.rejected.values().sum()
    }

    pub fn total_nulled(&self) -> usize {
        self.nulled.values().sum()
    }
}

fn bump(map: &mut BTreeMap<String, usize>, key: &str, count: usize) {
    if count == 0 {
        return;
    }
    *map.entry(key.to_string()).or_default() += count;
}
