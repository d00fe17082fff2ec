//! Sequential ingestion of every source into the rate store.

use crate::core::ledger::merge;
use crate::core::rate::{QuoteDirection, YearRange};
use crate::core::source::RateSource;
use crate::store::RateStore;
use anyhow::Result;
use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub currency: String,
    pub bank: String,
    pub direction: QuoteDirection,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceOutcome {
    Updated {
        fetched: usize,
        existing: usize,
        added: usize,
    },
    /// Source fetch or persistence failed; other sources are unaffected.
    Failed { error: String },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestSummary {
    pub reports: Vec<SourceReport>,
}

impl IngestSummary {
    /// Whether any partition was rewritten.
    pub fn changed(&self) -> bool {
        self.reports
            .iter()
            .any(|r| matches!(r.outcome, SourceOutcome::Updated { added, .. } if added > 0))
    }

    pub fn failures(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, SourceOutcome::Failed { .. }))
            .count()
    }
}

pub struct Ingestor<'a> {
    store: &'a RateStore,
}

impl<'a> Ingestor<'a> {
    pub fn new(store: &'a RateStore) -> Self {
        Self { store }
    }

    /// Fetches, merges and persists a single source.
    pub async fn ingest(&self, source: &dyn RateSource, years: YearRange) -> Result<SourceOutcome> {
        let bank = source.bank();
        let fetched = source.fetch(years).await?;
        let existing = self.store.load(&bank.code, &bank.direction)?;

        let (merged, added) = merge(&existing, &fetched);
        if added.is_empty() {
            info!("No new {} rates (all up to date)", bank.currency);
        } else {
            self.store.persist(&bank.code, &merged)?;
            info!("Added {} new {} rates", added.len(), bank.currency);
        }

        Ok(SourceOutcome::Updated {
            fetched: fetched.len(),
            existing: existing.len(),
            added: added.len(),
        })
    }

    /// Runs every source in order. A failing source is recorded and the run
    /// moves on to the next one.
    pub async fn run(&self, sources: &[Box<dyn RateSource>], years: YearRange) -> IngestSummary {
        self.run_with(sources, years, |_| {}).await
    }

    /// Same as [`Ingestor::run`], calling `on_report` as each source finishes.
    pub async fn run_with<F>(
        &self,
        sources: &[Box<dyn RateSource>],
        years: YearRange,
        mut on_report: F,
    ) -> IngestSummary
    where
        F: FnMut(&SourceReport),
    {
        let mut summary = IngestSummary::default();
        for source in sources {
            let bank = source.bank();
            info!(
                "Processing {} ({}), quote direction {}",
                bank.currency, bank.code, bank.direction
            );

            let outcome = match self.ingest(source.as_ref(), years).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Ingestion of {} failed: {:#}", bank.currency, e);
                    SourceOutcome::Failed {
                        error: format!("{e:#}"),
                    }
                }
            };
            let report = SourceReport {
                currency: bank.currency.clone(),
                bank: bank.code.clone(),
                direction: bank.direction.clone(),
                outcome,
            };
            on_report(&report);
            summary.reports.push(report);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bank::{BankInfo, Registry};
    use crate::core::rate::RateRecord;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    struct StaticSource {
        bank: BankInfo,
        rates: Vec<(&'static str, &'static str)>,
    }

    #[async_trait]
    impl RateSource for StaticSource {
        fn bank(&self) -> &BankInfo {
            &self.bank
        }

        async fn fetch(&self, _years: YearRange) -> Result<Vec<RateRecord>> {
            Ok(self
                .rates
                .iter()
                .map(|(d, r)| RateRecord {
                    date: NaiveDate::from_str(d).unwrap(),
                    rate: Decimal::from_str(r).unwrap(),
                    direction: self.bank.direction.clone(),
                })
                .collect())
        }
    }

    struct FailingSource {
        bank: BankInfo,
    }

    #[async_trait]
    impl RateSource for FailingSource {
        fn bank(&self) -> &BankInfo {
            &self.bank
        }

        async fn fetch(&self, _years: YearRange) -> Result<Vec<RateRecord>> {
            Err(anyhow!("connection reset"))
        }
    }

    fn bank(code: &str) -> BankInfo {
        Registry::standard().by_code(code).unwrap().clone()
    }

    fn years() -> YearRange {
        YearRange::new(2010, 2024).unwrap()
    }

    #[tokio::test]
    async fn test_failed_source_does_not_abort_run() {
        let dir = TempDir::new().unwrap();
        let store = RateStore::new(dir.path());
        let sources: Vec<Box<dyn RateSource>> = vec![
            Box::new(FailingSource { bank: bank("ECB") }),
            Box::new(StaticSource {
                bank: bank("NBP"),
                rates: vec![("2024-01-02", "3.9432"), ("2024-01-03", "4.0015")],
            }),
        ];

        let summary = Ingestor::new(&store).run(&sources, years()).await;
        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summary.failures(), 1);
        assert!(summary.changed());
        assert_eq!(
            summary.reports[0].outcome,
            SourceOutcome::Failed {
                error: "connection reset".to_string()
            }
        );
        assert_eq!(
            summary.reports[1].outcome,
            SourceOutcome::Updated {
                fetched: 2,
                existing: 0,
                added: 2
            }
        );
        assert_eq!(store.load("NBP", &bank("NBP").direction).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent_and_keeps_existing() {
        let dir = TempDir::new().unwrap();
        let store = RateStore::new(dir.path());
        let ingestor = Ingestor::new(&store);

        let first = StaticSource {
            bank: bank("NBP"),
            rates: vec![("2024-03-01", "1.10")],
        };
        ingestor.ingest(&first, years()).await.unwrap();
        let before = std::fs::read(store.partition_path("NBP", 2024)).unwrap();

        let refetch = StaticSource {
            bank: bank("NBP"),
            rates: vec![("2024-03-01", "9.99")],
        };
        let outcome = ingestor.ingest(&refetch, years()).await.unwrap();
        assert_eq!(
            outcome,
            SourceOutcome::Updated {
                fetched: 1,
                existing: 1,
                added: 0
            }
        );
        let after = std::fs::read(store.partition_path("NBP", 2024)).unwrap();
        assert_eq!(before, after);
    }
}
