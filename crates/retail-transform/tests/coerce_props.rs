//! Property-based tests for the field coercers.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;
use retail_model::{DateOrder, UnknownUnitPolicy};
use retail_transform::coerce::{
    NoisyInt, WeightConverter, card_digits, parse_currency, parse_date, repair_noisy_int,
};

fn converter() -> WeightConverter {
    let factors: BTreeMap<String, f64> = [("ml", 0.001), ("g", 0.001), ("kg", 1.0), ("k", 1.0)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    WeightConverter::new(factors, UnknownUnitPolicy::Null)
}

proptest! {
    #[test]
    fn grams_scale_by_one_thousandth(grams in 1u32..100_000) {
        let kg = converter().convert(&format!("{grams}g")).kilograms().unwrap();
        prop_assert!((kg - f64::from(grams) / 1000.0).abs() < 1e-9);
    }

    #[test]
    fn converted_weight_is_a_fixed_point(grams in 1u32..100_000) {
        let c = converter();
        let kg = c.convert(&format!("{grams}g")).kilograms().unwrap();
        let again = c.convert(&format!("{kg}")).kilograms().unwrap();
        prop_assert_eq!(kg, again);
    }

    #[test]
    fn iso_rendering_parses_back(days in 0i32..60_000) {
        let date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap() + chrono::Days::new(days as u64);
        let text = date.format("%Y-%m-%d").to_string();
        prop_assert_eq!(parse_date(&text, DateOrder::DayFirst), Some(date));
    }

    #[test]
    fn day_above_twelve_ignores_preference(day in 13u32..=28, month in 1u32..=12, year in 1950i32..2030) {
        let text = format!("{day}/{month}/{year}");
        let expected = NaiveDate::from_ymd_opt(year, month, day);
        prop_assert_eq!(parse_date(&text, DateOrder::MonthFirst), expected);
        prop_assert_eq!(parse_date(&text, DateOrder::DayFirst), expected);
        prop_assert_eq!(expected.map(|d| d.day()), Some(day));
    }

    #[test]
    fn card_digits_never_keep_letters(raw in "[?0-9A-Z]{1,19}") {
        let stripped: String = raw.chars().filter(|ch| *ch != '?').collect();
        match card_digits(&raw, "?") {
            Some(number) => prop_assert_eq!(stripped.parse::<u64>().ok(), Some(number)),
            None => prop_assert!(stripped.is_empty() || stripped.chars().any(|ch| ch.is_ascii_alphabetic())),
        }
    }

    #[test]
    fn clean_integers_are_untouched(value in -100_000i64..100_000) {
        let table = BTreeMap::new();
        prop_assert_eq!(repair_noisy_int(&value.to_string(), &table), NoisyInt::Clean(value));
    }

    #[test]
    fn pound_prefix_is_stripped(pence in 0u32..1_000_000) {
        let amount = f64::from(pence) / 100.0;
        let text = format!("£{amount}");
        prop_assert_eq!(parse_currency(&text, &["£"]), Some(amount));
    }
}
