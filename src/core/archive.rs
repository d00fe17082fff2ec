//! Read-only snapshot of every stored ledger, keyed by currency code.

use crate::core::bank::{BankInfo, Registry};
use crate::core::ledger::CurrencyLedger;
use crate::store::RateStore;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ArchivedLedger {
    pub bank: BankInfo,
    pub location: PathBuf,
    pub ledger: CurrencyLedger,
}

#[derive(Debug, Clone, Default)]
pub struct Archive {
    ledgers: BTreeMap<String, ArchivedLedger>,
}

impl Archive {
    /// Loads every registered bank that has a directory under the store.
    /// Banks without a directory are not part of the archive; a directory
    /// without rows yields an empty ledger.
    pub fn load(store: &RateStore, registry: &Registry) -> Result<Self> {
        let mut archive = Self::default();
        for bank in registry.banks() {
            if !store.has_bank(&bank.code) {
                debug!("No directory for bank {}, skipping {}", bank.code, bank.currency);
                continue;
            }
            let ledger = store.load(&bank.code, &bank.direction)?;
            debug!("Loaded {} rates for {}", ledger.len(), bank.currency);
            archive.insert(bank.clone(), store.bank_dir(&bank.code), ledger);
        }

        for code in store.banks()? {
            if registry.by_code(&code).is_none() {
                debug!("Ignoring unregistered bank directory {}", code);
            }
        }
        Ok(archive)
    }

    pub fn insert(&mut self, bank: BankInfo, location: PathBuf, ledger: CurrencyLedger) {
        self.ledgers.insert(
            bank.currency.to_uppercase(),
            ArchivedLedger {
                bank,
                location,
                ledger,
            },
        );
    }

    pub fn get(&self, currency: &str) -> Option<&ArchivedLedger> {
        self.ledgers.get(&currency.to_uppercase())
    }

    /// Sorted currency codes, including those without data.
    pub fn currencies(&self) -> Vec<String> {
        self.ledgers.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ArchivedLedger)> {
        self.ledgers.iter()
    }
}
