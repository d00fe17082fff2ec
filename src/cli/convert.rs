use crate::core::convert::parse_query_date;
use crate::core::{ConversionResult, Converter};
use anyhow::{Context, Result};
use rust_decimal::Decimal;

/// Parses the requested date and converts; a bad date becomes an error result
/// like any other query failure.
pub fn run_convert(
    converter: &Converter,
    amount_usd: Decimal,
    currency: &str,
    date: &str,
) -> ConversionResult {
    match parse_query_date(date) {
        Ok(date) => converter.convert(amount_usd, currency, date),
        Err(e) => e.into(),
    }
}

pub fn result_json(result: &ConversionResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("Failed to serialize conversion result")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Archive, CurrencyLedger, QueryError, Registry};
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn converter() -> Converter {
        let bank = Registry::standard().by_code("NBP").unwrap().clone();
        let mut ledger = CurrencyLedger::new(bank.direction.clone());
        ledger.insert(
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            Decimal::from_str("4.0015").unwrap(),
        );
        let mut archive = Archive::default();
        archive.insert(bank, PathBuf::from("rates/NBP"), ledger);
        Converter::new(archive)
    }

    #[test]
    fn test_convert_accepts_alternate_date_format() {
        let result = run_convert(&converter(), Decimal::from(100), "pln", "01/03/2024");
        let json: serde_json::Value = serde_json::from_str(&result_json(&result).unwrap()).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["converted_amount"], 400.15);
        assert_eq!(json["rate_date"], "2024-01-03");
    }

    #[test]
    fn test_invalid_date_is_an_error_result() {
        let result = run_convert(&converter(), Decimal::from(100), "PLN", "next tuesday");
        assert!(matches!(
            result.error(),
            Some(QueryError::InvalidDateFormat { input, .. }) if input == "next tuesday"
        ));
        let json: serde_json::Value = serde_json::from_str(&result_json(&result).unwrap()).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["kind"], "invalid_date_format");
    }
}
