//! USD conversion against an archive snapshot.
//!
//! Every outcome, including bad input, is returned as a [`ConversionResult`];
//! nothing here returns `Err` or panics on user input.

use crate::core::archive::Archive;
use crate::core::normalize::{QUERY_DATE_FORMATS, parse_date};
use crate::core::rate::QuoteDirection;
use crate::core::resolver;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Converted amounts are rounded half away from zero to this many places.
pub const AMOUNT_DECIMALS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CoverageBoundary {
    /// The requested date precedes every stored rate.
    BeforeEarliest { earliest_date: NaiveDate },
    /// The requested date is past the fallback window of the latest rates.
    AfterLatest { latest_date: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryError {
    #[error("Currency {requested} not supported. Available currencies: {}", available_currencies.join(", "))]
    UnknownCurrency {
        requested: String,
        available_currencies: Vec<String>,
    },

    #[error("Currency {currency} is configured but has no rate data. Please check {location}/ directory")]
    NoDataForCurrency { currency: String, location: String },

    #[error("{}", rate_not_found_message(currency, requested_date, boundary))]
    RateNotFound {
        currency: String,
        requested_date: NaiveDate,
        #[serde(flatten)]
        boundary: CoverageBoundary,
    },

    #[error("Invalid date format: '{input}'. Expected formats: {}", expected_formats.join(", "))]
    InvalidDateFormat {
        input: String,
        expected_formats: Vec<String>,
    },

    #[error("Invalid amount: {amount}. Amount in USD must be positive")]
    InvalidAmount { amount: Decimal },

    #[error("Amount {amount} USD is too large to convert to {currency} at rate {rate}")]
    AmountOutOfRange {
        amount: Decimal,
        currency: String,
        rate: Decimal,
    },
}

fn rate_not_found_message(
    currency: &str,
    requested_date: &NaiveDate,
    boundary: &CoverageBoundary,
) -> String {
    match boundary {
        CoverageBoundary::BeforeEarliest { earliest_date } => format!(
            "No exchange rate found for {currency} on {requested_date}. Earliest available rate: {earliest_date}"
        ),
        CoverageBoundary::AfterLatest { latest_date } => format!(
            "No exchange rate found for {currency} on or before {requested_date}. Latest available rate: {latest_date}"
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub amount_usd: Decimal,
    pub converted_amount: Decimal,
    pub currency: String,
    pub rate: Decimal,
    pub rate_date: NaiveDate,
    pub requested_date: NaiveDate,
    pub direction: QuoteDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionFailure {
    pub error: String,
    #[serde(flatten)]
    pub details: QueryError,
}

impl From<QueryError> for ConversionFailure {
    fn from(details: QueryError) -> Self {
        Self {
            error: details.to_string(),
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ConversionResult {
    Success(Conversion),
    Error(ConversionFailure),
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success(_))
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            ConversionResult::Error(failure) => Some(&failure.details),
            ConversionResult::Success(_) => None,
        }
    }
}

impl From<QueryError> for ConversionResult {
    fn from(error: QueryError) -> Self {
        ConversionResult::Error(error.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyCoverage {
    pub earliest_date: NaiveDate,
    pub latest_date: NaiveDate,
    pub total_days: usize,
}

/// Parses a user supplied date in any accepted format.
pub fn parse_query_date(input: &str) -> Result<NaiveDate, QueryError> {
    let formats: Vec<&str> = QUERY_DATE_FORMATS.iter().map(|(fmt, _)| *fmt).collect();
    parse_date(input, &formats).ok_or_else(|| QueryError::InvalidDateFormat {
        input: input.to_string(),
        expected_formats: QUERY_DATE_FORMATS
            .iter()
            .map(|(_, label)| label.to_string())
            .collect(),
    })
}

pub struct Converter {
    archive: Archive,
}

impl Converter {
    pub fn new(archive: Archive) -> Self {
        Self { archive }
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Coverage of every currency that has at least one rate.
    pub fn list_currencies(&self) -> BTreeMap<String, CurrencyCoverage> {
        self.archive
            .iter()
            .filter_map(|(code, entry)| {
                let ledger = &entry.ledger;
                Some((
                    code.clone(),
                    CurrencyCoverage {
                        earliest_date: ledger.earliest()?,
                        latest_date: ledger.latest()?,
                        total_days: ledger.len(),
                    },
                ))
            })
            .collect()
    }

    pub fn convert(&self, amount_usd: Decimal, currency: &str, date: NaiveDate) -> ConversionResult {
        if amount_usd <= Decimal::ZERO {
            return QueryError::InvalidAmount { amount: amount_usd }.into();
        }

        let code = currency.trim().to_uppercase();
        let Some(entry) = self.archive.get(&code).filter(|_| !code.is_empty()) else {
            return QueryError::UnknownCurrency {
                requested: currency.to_string(),
                available_currencies: self.archive.currencies(),
            }
            .into();
        };

        let ledger = &entry.ledger;
        let (Some(earliest), Some(latest)) = (ledger.earliest(), ledger.latest()) else {
            return QueryError::NoDataForCurrency {
                currency: code,
                location: entry.location.display().to_string(),
            }
            .into();
        };

        let Some(resolved) = resolver::find(ledger, date) else {
            let boundary = if date < earliest {
                CoverageBoundary::BeforeEarliest {
                    earliest_date: earliest,
                }
            } else {
                CoverageBoundary::AfterLatest {
                    latest_date: latest,
                }
            };
            return QueryError::RateNotFound {
                currency: code,
                requested_date: date,
                boundary,
            }
            .into();
        };

        if resolved.date != date {
            debug!(
                "No {} rate on {}, using {} instead",
                code, date, resolved.date
            );
        }

        let Some(product) = amount_usd.checked_mul(resolved.rate) else {
            return QueryError::AmountOutOfRange {
                amount: amount_usd,
                currency: code,
                rate: resolved.rate,
            }
            .into();
        };
        let converted_amount =
            product.round_dp_with_strategy(AMOUNT_DECIMALS, RoundingStrategy::MidpointAwayFromZero);

        ConversionResult::Success(Conversion {
            amount_usd,
            converted_amount,
            currency: code,
            rate: resolved.rate,
            rate_date: resolved.date,
            requested_date: date,
            direction: ledger.direction().clone(),
        })
    }
}
