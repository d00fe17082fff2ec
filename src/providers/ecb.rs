//! European Central Bank euro foreign exchange reference rates.
//!
//! The full history ships as one ZIP holding `eurofxref-hist.csv`: a comma
//! separated table with a `Date` column and one column per currency. The
//! `USD` column is the price of one euro in dollars.

use crate::core::bank::BankInfo;
use crate::core::normalize::{parse_date, parse_rate};
use crate::core::rate::{RateRecord, YearRange};
use crate::core::source::RateSource;
use crate::providers::util::{fetch_bytes, to_records};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::io::{Cursor, Read};
use tracing::{debug, info, instrument};

pub const BUNDLE_FILE: &str = "eurofxref-hist.zip";
pub const CSV_FILE: &str = "eurofxref-hist.csv";

/// Tried in order, first match wins. Day-first comes before month-first so
/// dates already stored keep their original reading.
const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%m/%d/%Y", "%d-%b-%Y", "%Y-%m-%d"];
const DATE_HEADER: &str = "date";
const RATE_HEADER: &str = "usd";

pub struct EcbSource {
    base_url: String,
    client: reqwest::Client,
    bank: BankInfo,
}

impl EcbSource {
    pub fn new(base_url: &str, client: reqwest::Client, bank: BankInfo) -> Self {
        EcbSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            bank,
        }
    }
}

/// Pulls the history CSV out of the bundle, falling back to the first CSV
/// entry when the expected name is absent.
pub fn extract_csv(bundle: &[u8]) -> Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bundle)).context("Failed to open ECB ZIP bundle")?;

    let index = match archive.index_for_name(CSV_FILE) {
        Some(index) => index,
        None => (0..archive.len())
            .find(|i| {
                archive
                    .name_for_index(*i)
                    .is_some_and(|name| name.to_lowercase().ends_with(".csv"))
            })
            .ok_or_else(|| anyhow!("No CSV file found in ECB bundle"))?,
    };

    let mut file = archive
        .by_index(index)
        .context("Failed to read CSV entry from ECB bundle")?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .context("ECB CSV is not valid UTF-8")?;
    Ok(content)
}

fn column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
}

/// Parses the history table. A missing `Date` or `USD` header fails the
/// batch; individual bad rows are dropped.
pub fn parse_history(content: &str, years: &YearRange) -> Result<Vec<(NaiveDate, Decimal)>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .context("Failed to read ECB CSV header")?
        .clone();
    let date_idx =
        column(&headers, DATE_HEADER).ok_or_else(|| anyhow!("ECB CSV has no Date column"))?;
    let rate_idx =
        column(&headers, RATE_HEADER).ok_or_else(|| anyhow!("ECB CSV has no USD column"))?;

    let pairs = reader
        .records()
        .filter_map(|row| {
            let row = row.ok()?;
            let date = parse_date(row.get(date_idx)?, &DATE_FORMATS)?;
            if !years.contains(date.year()) {
                return None;
            }
            let raw = row.get(rate_idx)?.trim();
            if raw.eq_ignore_ascii_case("N/A") {
                return None;
            }
            Some((date, parse_rate(raw, '.')?))
        })
        .collect();
    Ok(pairs)
}

#[async_trait]
impl RateSource for EcbSource {
    fn bank(&self) -> &BankInfo {
        &self.bank
    }

    #[instrument(name = "EcbFetch", skip_all, fields(years = %years))]
    async fn fetch(&self, years: YearRange) -> Result<Vec<RateRecord>> {
        let url = format!("{}/{}", self.base_url, BUNDLE_FILE);
        let bundle = fetch_bytes(&self.client, &url).await?;
        let content = extract_csv(&bundle)?;
        debug!("Extracted {} bytes of ECB history", content.len());

        let pairs = parse_history(&content, &years)?;
        info!("Got {} ECB rates", pairs.len());
        Ok(to_records(pairs, self.direction()))
    }
}
