use crate::core::rate::{QuoteDirection, RateRecord};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// All dated rates for one currency. Dates are unique and the quote
/// direction is shared by every entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyLedger {
    direction: QuoteDirection,
    rates: BTreeMap<NaiveDate, Decimal>,
}

impl CurrencyLedger {
    pub fn new(direction: QuoteDirection) -> Self {
        Self {
            direction,
            rates: BTreeMap::new(),
        }
    }

    pub fn direction(&self) -> &QuoteDirection {
        &self.direction
    }

    pub fn get(&self, date: &NaiveDate) -> Option<Decimal> {
        self.rates.get(date).copied()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn earliest(&self) -> Option<NaiveDate> {
        self.rates.keys().next().copied()
    }

    pub fn latest(&self) -> Option<NaiveDate> {
        self.rates.keys().next_back().copied()
    }

    /// Ascending entries grouped by calendar year.
    pub fn by_year(&self) -> BTreeMap<i32, Vec<(NaiveDate, Decimal)>> {
        let mut years: BTreeMap<i32, Vec<(NaiveDate, Decimal)>> = BTreeMap::new();
        for (date, rate) in &self.rates {
            years.entry(date.year()).or_default().push((*date, *rate));
        }
        years
    }

    /// Adds a rate unless the date is already present. Returns whether the
    /// entry was inserted.
    pub fn insert(&mut self, date: NaiveDate, rate: Decimal) -> bool {
        if self.rates.contains_key(&date) {
            return false;
        }
        self.rates.insert(date, rate);
        true
    }

    /// Unions `incoming` into the ledger. Stored dates always win; records
    /// quoted in another direction are rejected. Returns the dates added.
    pub fn merge<'a, I>(&mut self, incoming: I) -> BTreeSet<NaiveDate>
    where
        I: IntoIterator<Item = &'a RateRecord>,
    {
        let mut added = BTreeSet::new();
        for record in incoming {
            if record.direction != self.direction {
                warn!(
                    date = %record.date,
                    expected = %self.direction,
                    found = %record.direction,
                    "Rejecting record with mismatched quote direction"
                );
                continue;
            }
            if self.insert(record.date, record.rate) {
                added.insert(record.date);
            }
        }
        added
    }
}

/// Non-mutating form of [`CurrencyLedger::merge`].
pub fn merge(
    existing: &CurrencyLedger,
    incoming: &[RateRecord],
) -> (CurrencyLedger, BTreeSet<NaiveDate>) {
    let mut merged = existing.clone();
    let added = merged.merge(incoming);
    (merged, added)
}
