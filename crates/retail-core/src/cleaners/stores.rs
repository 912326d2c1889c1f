//! Stores: store locations from the store details API.

use polars::prelude::DataFrame;
use retail_model::{CleaningRules, Domain};
use retail_transform::coerce::{NoisyInt, repair_noisy_int};

use super::CleanOutcome;
use super::common::{Cleaning, warn_unreadable};
use crate::error::CleanError;

const STORE_TYPE: &str = "store_type";
const STAFF_NUMBERS: &str = "staff_numbers";
const CONTINENT: &str = "continent";

pub(super) fn clean_stores(raw: &DataFrame, rules: &CleaningRules) -> Result<CleanOutcome, CleanError> {
    let store_rules = &rules.stores;
    let mut cleaning = Cleaning::start(Domain::Stores, raw)?;
    cleaning.drop_columns(&store_rules.helper_columns)?;
    cleaning.require(&[STORE_TYPE, STAFF_NUMBERS, CONTINENT])?;
    cleaning.require(&store_rules.float_columns)?;
    cleaning.require(&store_rules.date_columns)?;

    cleaning.exclude_indices(&store_rules.excluded_indices)?;
    cleaning.filter_allowed(STORE_TYPE, &store_rules.allowed_store_types)?;

    cleaning.floats(&store_rules.float_columns)?;

    let mut repaired = 0;
    let mut unknown = 0;
    cleaning.integers(STAFF_NUMBERS, |raw| {
        let staff = match repair_noisy_int(raw, &store_rules.staff_number_repairs) {
            NoisyInt::Clean(v) => Some(v),
            NoisyInt::Repaired(v) => {
                repaired += 1;
                Some(v)
            }
            NoisyInt::Invalid => {
                if raw.chars().any(|ch| ch.is_alphabetic()) {
                    unknown += 1;
                }
                None
            }
        };
        // An open store has at least one member of staff.
        staff.filter(|count| *count > 0)
    })?;
    cleaning.report.record_repaired(STAFF_NUMBERS, repaired);
    warn_unreadable(
        cleaning.domain(),
        STAFF_NUMBERS,
        unknown,
        "Staff numbers with letters outside the repair table were set to null",
    );

    cleaning.dates(&store_rules.date_columns, rules.dates.order)?;
    cleaning.repair_values(CONTINENT, &store_rules.continent_repairs)?;
    Ok(cleaning.finish())
}
