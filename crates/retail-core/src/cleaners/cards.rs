//! Cards: payment card details from the card PDF export.

use polars::prelude::DataFrame;
use retail_model::{CleaningRules, Domain};
use retail_transform::coerce::normalize_expiry;

use super::CleanOutcome;
use super::common::Cleaning;
use crate::error::CleanError;

const CARD_NUMBER: &str = "card_number";
const CARD_PROVIDER: &str = "card_provider";
const EXPIRY_DATE: &str = "expiry_date";

pub(super) fn clean_cards(raw: &DataFrame, rules: &CleaningRules) -> Result<CleanOutcome, CleanError> {
    let card_rules = &rules.cards;
    let mut cleaning = Cleaning::start(Domain::Cards, raw)?;
    cleaning.require(&[CARD_PROVIDER, CARD_NUMBER, EXPIRY_DATE])?;
    cleaning.require(&card_rules.date_columns)?;

    cleaning.filter_allowed(CARD_PROVIDER, &card_rules.allowed_providers)?;

    // A card row is identified by its number; without one it is dropped.
    cleaning.card_numbers(CARD_NUMBER, &card_rules.placeholder_chars)?;
    cleaning.drop_null(CARD_NUMBER, CARD_NUMBER)?;

    cleaning.text(EXPIRY_DATE, normalize_expiry)?;
    cleaning.dates(&card_rules.date_columns, rules.dates.order)?;
    Ok(cleaning.finish())
}
