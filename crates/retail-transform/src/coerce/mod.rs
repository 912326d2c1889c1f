//! Field coercers.
//!
//! Each coercer turns one raw cell into a typed value or `None`; none of them
//! substitutes a zero or empty default for a value it cannot read.
//! - **text**: trimming, repair tables, code casing
//! - **datetime**: calendar dates, clock times, card expiries
//! - **numeric**: prices, integers with typing noise, card numbers
//! - **weight**: unit-suffixed weights to kilograms

pub mod datetime;
pub mod numeric;
pub mod text;
pub mod weight;

pub use datetime::{normalize_expiry, parse_date, parse_time_of_day};
pub use numeric::{NoisyInt, card_digits, parse_bounded_i64, parse_currency, repair_noisy_int};
pub use text::{normalize_text, repair_value, uppercase_code};
pub use weight::{Weight, WeightConverter, mean};
