//! Cleaning rules: allow-lists, repair tables and unit factors.
//!
//! The built-in rules ship with the crate as `rules/default_rules.toml`. A user
//! rules file is merged over them key by key before deserialization, so an
//! override file only has to name the entries it changes. Nested tables merge
//! recursively; arrays and scalars replace the built-in value.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

const DEFAULT_RULES: &str = include_str!("../rules/default_rules.toml");

/// Preference used when a numeric date is ambiguous (both parts ≤ 12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateOrder {
    #[default]
    MonthFirst,
    DayFirst,
}

/// What to do with a weight whose unit is not in the factor table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownUnitPolicy {
    /// Null the cell; it then takes part in mean imputation.
    #[default]
    Null,
    /// Keep the magnitude as if it were already kilograms.
    Keep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRules {
    pub order: DateOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserRules {
    pub allowed_countries: Vec<String>,
    pub country_code_repairs: BTreeMap<String, String>,
    pub date_columns: Vec<String>,
    pub string_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardRules {
    pub allowed_providers: Vec<String>,
    /// Characters stripped from card numbers before the digit check.
    pub placeholder_chars: String,
    pub date_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreRules {
    pub allowed_store_types: Vec<String>,
    /// Columns present in the raw extract that carry no information.
    pub helper_columns: Vec<String>,
    /// `index` values of rows known to be corrupt beyond repair.
    pub excluded_indices: Vec<i64>,
    pub float_columns: Vec<String>,
    pub date_columns: Vec<String>,
    pub staff_number_repairs: BTreeMap<String, i64>,
    pub continent_repairs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductRules {
    pub allowed_availability: Vec<String>,
    pub availability_repairs: BTreeMap<String, String>,
    pub currency_symbols: Vec<String>,
    /// Kilograms per unit, keyed by lowercase unit token.
    pub unit_factors: BTreeMap<String, f64>,
    pub unknown_unit: UnknownUnitPolicy,
    pub date_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderRules {
    pub junk_columns: Vec<String>,
    pub required_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateEventRules {
    pub allowed_time_periods: Vec<String>,
}

/// Complete rule set for every domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleaningRules {
    pub dates: DateRules,
    pub users: UserRules,
    pub cards: CardRules,
    pub stores: StoreRules,
    pub products: ProductRules,
    pub orders: OrderRules,
    pub date_events: DateEventRules,
}

impl CleaningRules {
    /// Returns the rules shipped with the crate.
    pub fn builtin() -> Result<Self> {
        let table = builtin_table()?;
        let rules: Self = toml::Value::Table(table)
            .try_into()
            .map_err(ConfigError::Builtin)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Parses an override document and merges it over the built-in rules.
    pub fn from_override_str(contents: &str) -> Result<Self> {
        let overrides: toml::Table =
            toml::from_str(contents).map_err(|source| ConfigError::toml("<rules>", source))?;
        Self::merged(overrides, Path::new("<rules>"))
    }

    /// Loads a user rules file and merges it over the built-in rules.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let overrides: toml::Table =
            toml::from_str(&contents).map_err(|e| ConfigError::toml(path, e))?;
        Self::merged(overrides, path)
    }

    /// Loads `path` when given, the built-in rules otherwise.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    fn merged(overrides: toml::Table, origin: &Path) -> Result<Self> {
        let mut table = builtin_table()?;
        merge_tables(&mut table, overrides);
        let rules: Self = toml::Value::Table(table)
            .try_into()
            .map_err(|e| ConfigError::toml(origin, e))?;
        rules.validate()?;
        Ok(rules)
    }

    /// Rejects rule sets that would make a cleaner drop every row or produce
    /// nonsensical conversions.
    pub fn validate(&self) -> Result<()> {
        let lists: [(&str, &[String]); 4] = [
            ("users.allowed_countries", &self.users.allowed_countries),
            ("cards.allowed_providers", &self.cards.allowed_providers),
            ("stores.allowed_store_types", &self.stores.allowed_store_types),
            ("date_events.allowed_time_periods", &self.date_events.allowed_time_periods),
        ];
        for (name, values) in lists {
            if values.iter().all(|v| v.trim().is_empty()) {
                return Err(invalid(format!("{name} must list at least one value")));
            }
        }
        if self.products.allowed_availability.is_empty() {
            return Err(invalid("products.allowed_availability must list at least one value"));
        }
        for (unit, factor) in &self.products.unit_factors {
            if unit.is_empty() || unit.chars().any(|ch| !ch.is_ascii_lowercase()) {
                return Err(invalid(format!(
                    "products.unit_factors key '{unit}' must be lowercase letters"
                )));
            }
            if !factor.is_finite() || *factor < 0.0 {
                return Err(invalid(format!(
                    "products.unit_factors.{unit} must be a finite non-negative number"
                )));
            }
        }
        if self
            .products
            .currency_symbols
            .iter()
            .any(|symbol| symbol.trim().is_empty())
        {
            return Err(invalid("products.currency_symbols must not contain blank entries"));
        }
        for (raw, repaired) in &self.stores.staff_number_repairs {
            if *repaired < 0 {
                return Err(invalid(format!(
                    "stores.staff_number_repairs.{raw} must not be negative"
                )));
            }
        }
        for (target, repaired) in &self.products.availability_repairs {
            if !self.products.allowed_availability.contains(repaired) {
                return Err(invalid(format!(
                    "products.availability_repairs.{target} maps to '{repaired}', which is not allowed"
                )));
            }
        }
        if self.orders.required_columns.is_empty() {
            return Err(invalid("orders.required_columns must name at least one column"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidRules {
        message: message.into(),
    }
}

fn builtin_table() -> Result<toml::Table> {
    toml::from_str(DEFAULT_RULES).map_err(ConfigError::Builtin)
}

/// Merges `overrides` into `base`. Nested tables merge; other values replace.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => {
                merge_tables(existing, nested);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_rules_parse_and_validate() {
        let rules = CleaningRules::builtin().unwrap();
        assert_eq!(rules.dates.order, DateOrder::MonthFirst);
        assert_eq!(rules.users.allowed_countries.len(), 3);
        assert_eq!(rules.cards.allowed_providers.len(), 10);
        assert_eq!(rules.stores.allowed_store_types.len(), 5);
        assert_eq!(rules.date_events.allowed_time_periods.len(), 4);
        assert_eq!(rules.stores.staff_number_repairs.get("A97"), Some(&97));
        assert_eq!(rules.products.unit_factors.get("ml"), Some(&0.001));
        assert_eq!(rules.products.unknown_unit, UnknownUnitPolicy::Null);
        assert!(rules.stores.excluded_indices.is_empty());
    }

    #[test]
    fn merge_keeps_sibling_keys() {
        let mut base: toml::Table = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overrides: toml::Table = toml::from_str("[a]\ny = 3\n").unwrap();
        merge_tables(&mut base, overrides);
        let a = base.get("a").and_then(toml::Value::as_table).unwrap();
        assert_eq!(a.get("x").and_then(toml::Value::as_integer), Some(1));
        assert_eq!(a.get("y").and_then(toml::Value::as_integer), Some(3));
    }

    #[test]
    fn invalid_unit_factor_is_rejected() {
        let err = CleaningRules::from_override_str("[products.unit_factors]\nlb = -1.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRules { .. }));
    }
}
