//! Date events: sale timestamps from the date details JSON document.

use polars::prelude::DataFrame;
use retail_model::{CleaningRules, Domain};
use retail_transform::coerce::{parse_bounded_i64, parse_time_of_day};

use super::CleanOutcome;
use super::common::Cleaning;
use crate::error::CleanError;

const TIME_PERIOD: &str = "time_period";
const TIMESTAMP: &str = "timestamp";

pub(super) fn clean_date_events(
    raw: &DataFrame,
    rules: &CleaningRules,
) -> Result<CleanOutcome, CleanError> {
    let mut cleaning = Cleaning::start(Domain::DateEvents, raw)?;
    cleaning.require(&[TIME_PERIOD, "month", "day", "year", TIMESTAMP])?;

    cleaning.filter_allowed(TIME_PERIOD, &rules.date_events.allowed_time_periods)?;

    cleaning.integers("month", |raw| parse_bounded_i64(raw, 1..=12))?;
    cleaning.integers("day", |raw| parse_bounded_i64(raw, 1..=31))?;
    cleaning.integers("year", |raw| parse_bounded_i64(raw, 1..=9999))?;
    cleaning.text(TIMESTAMP, |raw| {
        parse_time_of_day(raw).map(|time| time.format("%H:%M:%S").to_string())
    })?;
    Ok(cleaning.finish())
}
