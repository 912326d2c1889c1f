//! Orders: the orders fact table from the source database.

use polars::prelude::DataFrame;
use retail_model::{CleaningRules, Domain};
use retail_transform::coerce::parse_bounded_i64;

use super::CleanOutcome;
use super::common::Cleaning;
use crate::error::CleanError;

const CARD_NUMBER: &str = "card_number";
const PRODUCT_QUANTITY: &str = "product_quantity";
const PRODUCT_CODE: &str = "product_code";

pub(super) fn clean_orders(raw: &DataFrame, rules: &CleaningRules) -> Result<CleanOutcome, CleanError> {
    let order_rules = &rules.orders;
    let mut cleaning = Cleaning::start(Domain::Orders, raw)?;
    cleaning.drop_columns(&order_rules.junk_columns)?;
    cleaning.require(&[CARD_NUMBER, PRODUCT_QUANTITY, PRODUCT_CODE])?;

    cleaning.require_values(&order_rules.required_columns, "missing_key")?;

    cleaning.card_numbers(CARD_NUMBER, &rules.cards.placeholder_chars)?;
    cleaning.integers(PRODUCT_QUANTITY, |raw| parse_bounded_i64(raw, 0..=i64::MAX))?;
    cleaning.uppercase(PRODUCT_CODE)?;

    // A key that could not be coerced would be missing on the next run.
    for key in [CARD_NUMBER, PRODUCT_QUANTITY] {
        if order_rules.required_columns.iter().any(|column| column == key) {
            cleaning.drop_null(key, key)?;
        }
    }
    Ok(cleaning.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;
    use crate::cleaners::common::test_support::test_df;
    use retail_common::{column_names, string_column};

    fn raw_orders() -> DataFrame {
        test_df(vec![
            ("level_0", vec![Some("0"), Some("1"), Some("2"), Some("3")]),
            ("index", vec![Some("0"), Some("1"), Some("2"), Some("3")]),
            ("date_uuid", vec![Some("9476f17e"), Some("0423a395"), Some("65187294"), Some("a1")]),
            ("first_name", vec![None, None, None, None]),
            ("last_name", vec![None, None, None, None]),
            ("user_uuid", vec![Some("93caf182"), Some("8fe96c3a"), None, Some("u4")]),
            ("card_number", vec![Some("355357657872"), Some("4436161478"), Some("1"), Some("ABC")]),
            ("store_code", vec![Some("BL-8387506C"), Some("WEB-1388012W"), Some("X"), Some("Y")]),
            ("product_code", vec![Some("r8-0954823y"), Some("C2-7287916l"), Some("z"), Some("q")]),
            ("1", vec![None, None, None, None]),
            ("product_quantity", vec![Some("3"), Some("2"), Some("1"), Some("4")]),
        ])
    }

    #[test]
    fn junk_columns_are_removed() {
        let rules = CleaningRules::builtin().unwrap();
        let outcome = clean_orders(&raw_orders(), &rules).unwrap();
        let names = column_names(&outcome.frame);
        for junk in ["first_name", "last_name", "1", "level_0"] {
            assert!(!names.contains(&junk.to_string()), "{junk} should be dropped");
        }
        assert!(names.contains(&"index".to_string()));
    }

    #[test]
    fn rows_missing_keys_or_with_bad_card_numbers_are_dropped() {
        let rules = CleaningRules::builtin().unwrap();
        let outcome = clean_orders(&raw_orders(), &rules).unwrap();
        let df = &outcome.frame;
        assert_eq!(string_column(df, "date_uuid").unwrap(), vec!["9476f17e", "0423a395"]);
        assert_eq!(outcome.report.rejected.get("missing_key"), Some(&1));
        assert_eq!(outcome.report.rejected.get(CARD_NUMBER), Some(&1));
    }

    #[test]
    fn keys_are_typed_and_codes_uppercased() {
        let rules = CleaningRules::builtin().unwrap();
        let outcome = clean_orders(&raw_orders(), &rules).unwrap();
        let df = &outcome.frame;
        assert_eq!(df.column(CARD_NUMBER).unwrap().dtype(), &DataType::UInt64);
        assert_eq!(df.column(PRODUCT_QUANTITY).unwrap().dtype(), &DataType::Int64);
        assert_eq!(
            string_column(df, PRODUCT_CODE).unwrap(),
            vec!["R8-0954823Y", "C2-7287916L"]
        );
    }

    #[test]
    fn missing_key_column_is_structural() {
        let rules = CleaningRules::builtin().unwrap();
        let raw = test_df(vec![("date_uuid", vec![Some("a")])]);
        assert!(matches!(
            clean_orders(&raw, &rules),
            Err(CleanError::MissingColumn { .. })
        ));
    }
}
