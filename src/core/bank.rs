//! Central banks known to the archive and the currency each one quotes.

use crate::core::rate::QuoteDirection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankInfo {
    pub code: String,
    pub currency: String,
    pub direction: QuoteDirection,
    pub name: String,
}

impl BankInfo {
    pub fn new(code: &str, name: &str, direction: QuoteDirection) -> Self {
        Self {
            code: code.to_string(),
            currency: direction.currency().to_string(),
            direction,
            name: name.to_string(),
        }
    }
}

/// Immutable bank table built once at startup and handed to the components
/// that need it.
#[derive(Debug, Clone)]
pub struct Registry {
    banks: Vec<BankInfo>,
}

impl Registry {
    pub fn new(banks: Vec<BankInfo>) -> Self {
        Self { banks }
    }

    /// ECB, NBP and RBA, in ingestion order.
    pub fn standard() -> Self {
        Self::new(vec![
            BankInfo::new(
                "ECB",
                "European Central Bank",
                QuoteDirection::ToUsd("EUR".to_string()),
            ),
            BankInfo::new(
                "NBP",
                "Narodowy Bank Polski (National Bank of Poland)",
                QuoteDirection::UsdTo("PLN".to_string()),
            ),
            BankInfo::new(
                "RBA",
                "Reserve Bank of Australia",
                QuoteDirection::ToUsd("AUD".to_string()),
            ),
        ])
    }

    pub fn banks(&self) -> &[BankInfo] {
        &self.banks
    }

    pub fn by_code(&self, code: &str) -> Option<&BankInfo> {
        self.banks.iter().find(|b| b.code.eq_ignore_ascii_case(code))
    }
}
