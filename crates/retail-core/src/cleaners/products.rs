//! Products: the product catalogue from object storage.

use std::collections::BTreeMap;

use polars::prelude::{AnyValue, DataFrame};
use tracing::warn;

use retail_common::{any_to_f64, any_to_string, cell_values, rename_column, set_f64_column};
use retail_model::{CleaningRules, Domain, UnknownUnitPolicy};
use retail_transform::coerce::{Weight, WeightConverter, mean, parse_currency};

use super::CleanOutcome;
use super::common::{Cleaning, Coerced, coerce_cell};
use crate::error::CleanError;

const AVAILABILITY: &str = "removed";
const PRICE: &str = "product_price";
const WEIGHT: &str = "weight";
const WEIGHT_KG: &str = "weight_kg";
const PRODUCT_CODE: &str = "product_code";

pub(super) fn clean_products(
    raw: &DataFrame,
    rules: &CleaningRules,
) -> Result<CleanOutcome, CleanError> {
    let product_rules = &rules.products;
    let mut cleaning = Cleaning::start(Domain::Products, raw)?;
    // Already-cleaned datasets carry `weight_kg` instead of `weight`.
    let weight_column = if cleaning.has(WEIGHT) { WEIGHT } else { WEIGHT_KG };
    cleaning.require(&[AVAILABILITY, weight_column, PRICE, PRODUCT_CODE])?;
    cleaning.require(&product_rules.date_columns)?;

    cleaning.repair_values(AVAILABILITY, &product_rules.availability_repairs)?;
    cleaning.filter_allowed(AVAILABILITY, &product_rules.allowed_availability)?;

    let symbols = &product_rules.currency_symbols;
    let prices = cell_values(&cleaning.df, PRICE, |value| {
        coerce_cell(value, |raw| parse_currency(&any_to_string(raw), symbols))
    })?;
    cleaning.write_coerced(PRICE, prices, set_f64_column)?;

    let converter = WeightConverter::from_rules(product_rules);
    normalize_weights(&mut cleaning, weight_column, &converter, product_rules.unknown_unit)?;
    if weight_column == WEIGHT {
        rename_column(&mut cleaning.df, WEIGHT, WEIGHT_KG)?;
    }

    cleaning.uppercase(PRODUCT_CODE)?;
    cleaning.dates(&product_rules.date_columns, rules.dates.order)?;
    Ok(cleaning.finish())
}

/// Converts `column` to kilograms, then fills missing weights with the mean
/// of the weights that could be read.
fn normalize_weights(
    cleaning: &mut Cleaning,
    column: &str,
    converter: &WeightConverter,
    policy: UnknownUnitPolicy,
) -> Result<(), CleanError> {
    let mut unknown_units: BTreeMap<String, usize> = BTreeMap::new();
    let weights = cell_values(&cleaning.df, column, |value| match value {
        AnyValue::Float64(kg) => Coerced::Value(kg),
        other => coerce_cell(other, |raw| {
            let weight = converter.convert(&any_to_string(raw));
            if let Weight::UnknownUnit { unit, .. } = &weight {
                *unknown_units.entry(unit.clone()).or_default() += 1;
            }
            weight.kilograms()
        }),
    })?;
    for (unit, count) in &unknown_units {
        warn!(
            domain = %cleaning.domain(),
            column,
            unit = unit.as_str(),
            count,
            policy = ?policy,
            "Weights with an unknown unit"
        );
    }
    cleaning.write_coerced(column, weights, set_f64_column)?;

    let mut weights = cell_values(&cleaning.df, column, any_to_f64)?;
    let missing = weights.iter().filter(|w| w.is_none()).count();
    if missing == 0 {
        return Ok(());
    }
    let Some(average) = mean(&weights) else {
        warn!(
            domain = %cleaning.domain(),
            column,
            "No readable weights; missing weights left empty"
        );
        return Ok(());
    };
    for weight in weights.iter_mut().filter(|w| w.is_none()) {
        *weight = Some(average);
    }
    set_f64_column(&mut cleaning.df, column, weights)?;
    cleaning.report.record_imputed(WEIGHT_KG, missing);
    Ok(())
}
