pub mod partition;

use crate::core::ledger::CurrencyLedger;
use crate::core::rate::QuoteDirection;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const PARTITION_FILE: &str = "rates.csv";

/// Year-partitioned CSV storage rooted at `rates/`:
/// `<root>/<BANK>/<YEAR>/rates.csv`.
#[derive(Debug, Clone)]
pub struct RateStore {
    root: PathBuf,
}

impl RateStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bank_dir(&self, bank_code: &str) -> PathBuf {
        self.root.join(bank_code)
    }

    pub fn partition_path(&self, bank_code: &str, year: i32) -> PathBuf {
        self.bank_dir(bank_code)
            .join(year.to_string())
            .join(PARTITION_FILE)
    }

    /// Bank directories currently present on disk, upper-cased and sorted.
    pub fn banks(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut banks = Vec::new();
        for entry in fs::read_dir(&self.root)
            .with_context(|| format!("Failed to read rates directory: {}", self.root.display()))?
        {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                banks.push(entry.file_name().to_string_lossy().to_uppercase());
            }
        }
        banks.sort();
        Ok(banks)
    }

    pub fn has_bank(&self, bank_code: &str) -> bool {
        self.bank_dir(bank_code).is_dir()
    }

    /// Reads every year partition of a bank. A missing bank directory yields
    /// an empty ledger.
    pub fn load(&self, bank_code: &str, direction: &QuoteDirection) -> Result<CurrencyLedger> {
        let mut ledger = CurrencyLedger::new(direction.clone());
        let bank_dir = self.bank_dir(bank_code);
        if !bank_dir.is_dir() {
            debug!("No stored rates at {}", bank_dir.display());
            return Ok(ledger);
        }

        for entry in fs::read_dir(&bank_dir)
            .with_context(|| format!("Failed to read bank directory: {}", bank_dir.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let file = entry.path().join(PARTITION_FILE);
            if !file.is_file() {
                continue;
            }
            match partition::read(&file) {
                Ok(records) => {
                    let added = ledger.merge(&records);
                    debug!("Loaded {} rates from {}", added.len(), file.display());
                }
                Err(e) => warn!("Skipping unreadable partition {}: {:#}", file.display(), e),
            }
        }

        Ok(ledger)
    }

    /// Rewrites every year partition of the ledger in full.
    pub fn persist(&self, bank_code: &str, ledger: &CurrencyLedger) -> Result<()> {
        for (year, rows) in ledger.by_year() {
            let path = self.partition_path(bank_code, year);
            partition::write(&path, ledger.direction(), &rows)?;
            info!("Saved {} rates to {}", rows.len(), path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn pln() -> QuoteDirection {
        QuoteDirection::UsdTo("PLN".to_string())
    }

    fn sample_ledger() -> CurrencyLedger {
        let mut ledger = CurrencyLedger::new(pln());
        for (d, r) in [
            ("2024-01-02", "3.9432"),
            ("2023-12-29", "3.9350"),
            ("2023-12-28", "3.9187"),
        ] {
            ledger.insert(
                NaiveDate::from_str(d).unwrap(),
                Decimal::from_str(r).unwrap(),
            );
        }
        ledger
    }

    #[test]
    fn test_load_missing_bank_is_empty() -> Result<()> {
        let dir = TempDir::new()?;
        let store = RateStore::new(dir.path());

        let ledger = store.load("NBP", &pln())?;
        assert!(ledger.is_empty());
        assert!(store.banks()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_persist_partitions_by_year() -> Result<()> {
        let dir = TempDir::new()?;
        let store = RateStore::new(dir.path());
        store.persist("NBP", &sample_ledger())?;

        let content_2023 = fs::read_to_string(store.partition_path("NBP", 2023))?;
        assert_eq!(
            content_2023,
            "date,rate,direction\n2023-12-28,3.9187,USD_TO_PLN\n2023-12-29,3.9350,USD_TO_PLN\n"
        );
        let content_2024 = fs::read_to_string(store.partition_path("NBP", 2024))?;
        assert_eq!(content_2024, "date,rate,direction\n2024-01-02,3.9432,USD_TO_PLN\n");
        assert_eq!(store.banks()?, vec!["NBP".to_string()]);
        Ok(())
    }

    #[test]
    fn test_persist_twice_is_byte_identical() -> Result<()> {
        let dir = TempDir::new()?;
        let store = RateStore::new(dir.path());
        let ledger = sample_ledger();

        store.persist("NBP", &ledger)?;
        let first = fs::read(store.partition_path("NBP", 2023))?;
        store.persist("NBP", &ledger)?;
        let second = fs::read(store.partition_path("NBP", 2023))?;

        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_round_trip_through_disk() -> Result<()> {
        let dir = TempDir::new()?;
        let store = RateStore::new(dir.path());
        let ledger = sample_ledger();
        store.persist("NBP", &ledger)?;

        let loaded = store.load("NBP", &pln())?;
        assert_eq!(loaded, ledger);
        Ok(())
    }

    #[test]
    fn test_load_skips_malformed_rows_and_stray_files() -> Result<()> {
        let dir = TempDir::new()?;
        let store = RateStore::new(dir.path());
        let year_dir = store.bank_dir("NBP").join("2024");
        fs::create_dir_all(&year_dir)?;
        fs::write(
            year_dir.join(PARTITION_FILE),
            "date,rate,direction\n2024-01-02,3.9432,USD_TO_PLN\nnot-a-date,3.1,USD_TO_PLN\n2024-01-03,abc,USD_TO_PLN\n2024-01-04,0.25,PLN_TO_USD\n",
        )?;
        fs::write(store.bank_dir("NBP").join("notes.txt"), "ignored")?;

        let ledger = store.load("NBP", &pln())?;
        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.get(&NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
            Decimal::from_str("3.9432").ok()
        );
        Ok(())
    }
}
