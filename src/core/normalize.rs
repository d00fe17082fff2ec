//! Date and decimal normalization shared by the source parsers.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Accepted user input formats for query dates, in priority order.
pub const QUERY_DATE_FORMATS: [(&str, &str); 5] = [
    ("%Y-%m-%d", "YYYY-MM-DD"),
    ("%m/%d/%Y", "MM/DD/YYYY"),
    ("%d-%m-%Y", "DD-MM-YYYY"),
    ("%Y/%m/%d", "YYYY/MM/DD"),
    ("%d/%m/%Y", "DD/MM/YYYY"),
];

/// Tries each pattern in order; the first successful parse wins.
pub fn parse_date(value: &str, formats: &[&str]) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Parses a decimal written with `separator` as the decimal mark. Only
/// strictly positive values are accepted.
pub fn parse_rate(value: &str, separator: char) -> Option<Decimal> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let normalized = if separator == '.' {
        value.to_string()
    } else {
        value.replace(separator, ".")
    };
    Decimal::from_str(&normalized)
        .ok()
        .filter(|rate| rate.is_sign_positive() && !rate.is_zero())
}

/// Converts a spreadsheet float without inventing binary noise digits.
pub fn rate_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    parse_rate(&value.to_string(), '.')
}
