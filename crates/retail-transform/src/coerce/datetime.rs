//! Calendar date and time-of-day parsing.
//!
//! Raw extracts mix ISO dates, slash/dash numeric dates in either field order
//! and free-text dates with the month spelled out in any position
//! (`1968 October 16`, `January 1951 27`, `16 October 1968`, `Oct 16, 1968`).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use retail_model::DateOrder;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Parses a raw date string, returning `None` when it is not a real calendar date.
///
/// `order` decides numeric dates whose first two parts are both ≤ 12; a part
/// greater than 12 fixes the order regardless of the preference.
pub fn parse_date(value: &str, order: DateOrder) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(date) = try_parse_iso(trimmed) {
        return Some(date);
    }

    let tokens: Vec<&str> = trimmed
        .split(|ch: char| ch.is_whitespace() || matches!(ch, '/' | '-' | ',' | '.'))
        .filter(|token| !token.is_empty())
        // A trailing clock time never changes the date.
        .filter(|token| !token.contains(':'))
        .collect();
    if tokens.len() != 3 {
        return None;
    }

    let named = tokens
        .iter()
        .enumerate()
        .filter_map(|(pos, token)| month_from_name(token).map(|month| (pos, month)))
        .collect::<Vec<_>>();
    match named.as_slice() {
        [(pos, month)] => {
            let numbers: Vec<&str> = tokens
                .iter()
                .enumerate()
                .filter(|(idx, _)| idx != pos)
                .map(|(_, token)| *token)
                .collect();
            parse_named_month(*month, &numbers)
        }
        [] => parse_numeric(&tokens, order),
        _ => None,
    }
}

fn try_parse_iso(value: &str) -> Option<NaiveDate> {
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    // Zoned timestamps keep the calendar date as written, not the UTC date.
    if let Some(dt) = DateTime::parse_from_rfc3339(value).ok().or_else(|| {
        OFFSET_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
    }) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
}

/// Matches full month names and their three-letter (or longer) prefixes.
fn month_from_name(token: &str) -> Option<u32> {
    if token.len() < 3 || !token.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return None;
    }
    let lower = token.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|name| name.starts_with(&lower))
        .and_then(|idx| u32::try_from(idx + 1).ok())
}

fn parse_named_month(month: u32, numbers: &[&str]) -> Option<NaiveDate> {
    let [a, b] = numbers else {
        return None;
    };
    if !is_digits(a) || !is_digits(b) {
        return None;
    }
    // The year is the four-digit number; the other one is the day.
    let (year, day) = match (a.len(), b.len()) {
        (4, 1..=2) => (*a, *b),
        (1..=2, 4) => (*b, *a),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)
}

fn parse_numeric(tokens: &[&str], order: DateOrder) -> Option<NaiveDate> {
    if !tokens.iter().all(|token| is_digits(token)) {
        return None;
    }
    let [first, second, third] = tokens else {
        return None;
    };
    if first.len() == 4 {
        return NaiveDate::from_ymd_opt(
            first.parse().ok()?,
            second.parse().ok()?,
            third.parse().ok()?,
        );
    }
    if third.len() != 4 || first.len() > 2 || second.len() > 2 {
        return None;
    }
    let year: i32 = third.parse().ok()?;
    let a: u32 = first.parse().ok()?;
    let b: u32 = second.parse().ok()?;
    let (month, day) = if a > 12 {
        (b, a)
    } else if b > 12 {
        (a, b)
    } else {
        match order {
            DateOrder::MonthFirst => (a, b),
            DateOrder::DayFirst => (b, a),
        }
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a strict `HH:MM:SS` clock time.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let trimmed = value.trim();
    if trimmed.len() != 8 {
        return None;
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S").ok()
}

/// Normalizes a card expiry `MM/YY`; single-digit months gain a leading zero.
pub fn normalize_expiry(value: &str) -> Option<String> {
    let (month, year) = value.trim().split_once('/')?;
    if !is_digits(month) || month.len() > 2 || year.len() != 2 || !is_digits(year) {
        return None;
    }
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(format!("{month:02}/{year}"))
}
