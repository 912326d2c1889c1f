//! Users: customer accounts from the legacy users table.

use polars::prelude::DataFrame;
use retail_model::{CleaningRules, Domain};

use super::CleanOutcome;
use super::common::Cleaning;
use crate::error::CleanError;

pub(super) fn clean_users(raw: &DataFrame, rules: &CleaningRules) -> Result<CleanOutcome, CleanError> {
    let user_rules = &rules.users;
    let mut cleaning = Cleaning::start(Domain::Users, raw)?;
    cleaning.require(&["country", "country_code"])?;
    cleaning.require(&user_rules.date_columns)?;

    cleaning.filter_allowed("country", &user_rules.allowed_countries)?;

    cleaning.trim_strings(&user_rules.string_columns)?;
    cleaning.repair_values("country_code", &user_rules.country_code_repairs)?;
    cleaning.dates(&user_rules.date_columns, rules.dates.order)?;
    Ok(cleaning.finish())
}
