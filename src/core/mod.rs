//! Core business logic: rate model, ledgers, resolution and conversion

pub mod archive;
pub mod bank;
pub mod config;
pub mod convert;
pub mod ingest;
pub mod ledger;
pub mod log;
pub mod normalize;
pub mod rate;
pub mod resolver;
pub mod source;

// Re-export main types for cleaner imports
pub use archive::Archive;
pub use bank::{BankInfo, Registry};
pub use convert::{ConversionResult, Converter, QueryError};
pub use ledger::CurrencyLedger;
pub use rate::{QuoteDirection, RateRecord, YearRange};
pub use source::RateSource;
