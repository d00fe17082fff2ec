//! Rate source abstraction

use crate::core::bank::BankInfo;
use crate::core::rate::{QuoteDirection, RateRecord, YearRange};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RateSource: Send + Sync {
    fn bank(&self) -> &BankInfo;

    fn direction(&self) -> &QuoteDirection {
        &self.bank().direction
    }

    /// Fetches and normalizes every rate within `years`. Unparseable rows are
    /// dropped; an error means the whole source failed for this run.
    async fn fetch(&self, years: YearRange) -> Result<Vec<RateRecord>>;
}
