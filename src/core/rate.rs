//! Canonical rate types shared by ingestion and conversion

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt::Display;
use std::str::FromStr;

pub const USD: &str = "USD";

/// Which side of a stored rate is the one-unit base.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QuoteDirection {
    /// 1 USD = X units of the currency
    UsdTo(String),
    /// 1 unit of the currency = X USD
    ToUsd(String),
}

impl QuoteDirection {
    pub fn currency(&self) -> &str {
        match self {
            QuoteDirection::UsdTo(c) | QuoteDirection::ToUsd(c) => c,
        }
    }

    pub fn base(&self) -> &str {
        match self {
            QuoteDirection::UsdTo(_) => USD,
            QuoteDirection::ToUsd(c) => c,
        }
    }

    pub fn quote(&self) -> &str {
        match self {
            QuoteDirection::UsdTo(c) => c,
            QuoteDirection::ToUsd(_) => USD,
        }
    }

    /// Human readable form, e.g. `1 EUR = X USD`.
    pub fn describe(&self) -> String {
        format!("1 {} = X {}", self.base(), self.quote())
    }
}

impl Display for QuoteDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_TO_{}", self.base(), self.quote())
    }
}

impl FromStr for QuoteDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_uppercase();
        let (base, quote) = tag
            .split_once("_TO_")
            .ok_or_else(|| anyhow!("Invalid quote direction: {}", s))?;

        match (base, quote) {
            (USD, USD) => Err(anyhow!("Invalid quote direction: {}", s)),
            (USD, _) if !quote.is_empty() => Ok(QuoteDirection::UsdTo(quote.to_string())),
            (_, USD) if !base.is_empty() => Ok(QuoteDirection::ToUsd(base.to_string())),
            _ => Err(anyhow!("Quote direction must involve USD: {}", s)),
        }
    }
}

impl Serialize for QuoteDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One normalized observation produced by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRecord {
    pub date: NaiveDate,
    pub rate: Decimal,
    pub direction: QuoteDirection,
}

/// Inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            return Err(anyhow!("Invalid year range: {start} > {end}"));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }

    pub fn overlaps(&self, start: i32, end: i32) -> bool {
        start <= self.end && end >= self.start
    }

    pub fn years(&self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }
}

impl Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
