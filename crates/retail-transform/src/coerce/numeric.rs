//! Numeric coercion: prices, integers with typing noise, card numbers.

use std::collections::BTreeMap;

use retail_common::{parse_f64, parse_i64};

/// Parses a price such as `£3.99`, stripping one leading currency symbol.
///
/// Plain numbers pass through so already-clean prices stay unchanged.
pub fn parse_currency<S: AsRef<str>>(value: &str, symbols: &[S]) -> Option<f64> {
    let trimmed = value.trim();
    let amount = symbols
        .iter()
        .find_map(|symbol| trimmed.strip_prefix(symbol.as_ref()))
        .unwrap_or(trimmed);
    parse_f64(amount)
}

/// Result of coercing an integer that may carry stray letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoisyInt {
    /// The value was already a clean integer.
    Clean(i64),
    /// The value matched a known-bad entry and was replaced.
    Repaired(i64),
    /// Not an integer and not a known-bad value.
    Invalid,
}

impl NoisyInt {
    pub fn value(self) -> Option<i64> {
        match self {
            Self::Clean(v) | Self::Repaired(v) => Some(v),
            Self::Invalid => None,
        }
    }
}

/// Coerces an integer using the closed table of known-bad values.
///
/// Blank input is `Invalid`. Whole-number floats such as `"78.0"` count as clean.
pub fn repair_noisy_int(value: &str, repairs: &BTreeMap<String, i64>) -> NoisyInt {
    let trimmed = value.trim();
    if let Some(v) = parse_i64(trimmed) {
        return NoisyInt::Clean(v);
    }
    if let Some(v) = parse_f64(trimmed).filter(|v| v.fract() == 0.0 && v.abs() < 9.0e15) {
        return NoisyInt::Clean(v as i64);
    }
    match repairs.get(trimmed) {
        Some(v) => NoisyInt::Repaired(*v),
        None => NoisyInt::Invalid,
    }
}

/// Strips placeholder characters from a card number and parses the digits.
///
/// Anything other than digits left after stripping makes the value invalid.
pub fn card_digits(value: &str, placeholders: &str) -> Option<u64> {
    let digits: String = value
        .trim()
        .chars()
        .filter(|ch| !placeholders.contains(*ch))
        .collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Parses an integer and keeps it only when it lies in `range`.
pub fn parse_bounded_i64(value: &str, range: std::ops::RangeInclusive<i64>) -> Option<i64> {
    let trimmed = value.trim();
    parse_i64(trimmed)
        .or_else(|| {
            parse_f64(trimmed)
                .filter(|v| v.fract() == 0.0 && v.abs() < 9.0e15)
                .map(|v| v as i64)
        })
        .filter(|v| range.contains(v))
}
