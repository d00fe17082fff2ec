//! Reserve Bank of Australia historical exchange rate workbooks (table F11).
//!
//! History is split into `.xls` files covering a few years each. Ten rows of
//! titles and notes precede the header row; the rate column is the price of
//! one Australian dollar in US dollars.

use crate::core::bank::BankInfo;
use crate::core::normalize::{parse_date, parse_rate, rate_from_f64};
use crate::core::rate::{RateRecord, YearRange};
use crate::core::source::RateSource;
use crate::providers::util::{fetch_bytes, to_records};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use calamine::{Data, Reader, Xls, open_workbook_from_rs};
use chrono::{Datelike, Days, NaiveDate};
use futures::future::join_all;
use rust_decimal::Decimal;
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Remote files and the years each one covers.
pub const URL_RANGES: [(&str, i32, i32); 4] = [
    ("2010-2013", 2010, 2013),
    ("2014-2017", 2014, 2017),
    ("2018-2022", 2018, 2022),
    ("2023-current", 2023, 9999),
];

pub const SKIP_ROWS: usize = 10;

const DATE_KEYWORDS: [&str; 1] = ["date"];
const RATE_KEYWORDS: [&str; 2] = ["a$1=usd", "aud/usd"];
const TEXT_DATE_FORMATS: [&str; 1] = ["%d-%b-%Y"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not identify date and USD rate columns in header {header:?}")]
pub struct UnresolvableColumns {
    pub header: Vec<String>,
}

/// Locates `(date, rate)` column indexes in a header row. Name matching is
/// case-insensitive and the last matching column wins. When either column
/// cannot be named, the first two columns are assumed.
pub fn resolve_columns(header: &[String]) -> Result<(usize, usize), UnresolvableColumns> {
    let normalized: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();
    let is_date = |h: &String| DATE_KEYWORDS.iter().any(|k| h.contains(k));
    let is_rate = |h: &String| RATE_KEYWORDS.iter().any(|k| h.contains(k));

    let date_idx = normalized.iter().rposition(is_date);
    let rate_idx = normalized.iter().rposition(|h| !is_date(h) && is_rate(h));

    match (date_idx, rate_idx) {
        (Some(date_idx), Some(rate_idx)) => Ok((date_idx, rate_idx)),
        _ if header.len() >= 2 => {
            debug!("Falling back to positional columns for header {:?}", header);
            Ok((0, 1))
        }
        _ => Err(UnresolvableColumns {
            header: header.to_vec(),
        }),
    }
}

fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.trunc() as u64))
}

fn cell_date(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime().map(|d| d.date()),
        Data::DateTimeIso(s) => parse_date(s.get(..10)?, &["%Y-%m-%d"]),
        Data::String(s) => parse_date(s, &TEXT_DATE_FORMATS),
        Data::Float(f) => excel_serial_to_date(*f),
        _ => None,
    }
}

fn cell_rate(cell: &Data) -> Option<Decimal> {
    match cell {
        Data::Float(f) => rate_from_f64(*f),
        Data::Int(i) if *i > 0 => Some(Decimal::from(*i)),
        Data::String(s) => parse_rate(s, '.'),
        _ => None,
    }
}

/// Parses a sheet given as rows. `skip` rows are dropped, the next row is the
/// header, and everything after it is data. Fails only when the columns
/// cannot be identified.
pub fn parse_table<'a, I>(rows: I, skip: usize, years: &YearRange) -> Result<Vec<(NaiveDate, Decimal)>>
where
    I: IntoIterator<Item = &'a [Data]>,
{
    let mut rows = rows.into_iter().skip(skip);
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| anyhow!("Worksheet has no header row"))?
        .iter()
        .map(|cell| cell.to_string())
        .collect();
    let (date_idx, rate_idx) = resolve_columns(&header)?;

    Ok(rows
        .filter_map(|row| {
            let date = cell_date(row.get(date_idx)?)?;
            if !years.contains(date.year()) {
                return None;
            }
            Some((date, cell_rate(row.get(rate_idx)?)?))
        })
        .collect())
}

pub fn parse_workbook(payload: &[u8], years: &YearRange) -> Result<Vec<(NaiveDate, Decimal)>> {
    let mut workbook: Xls<_> =
        open_workbook_from_rs(Cursor::new(payload)).context("Failed to open RBA workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("RBA workbook has no worksheets"))?
        .context("Failed to read RBA worksheet")?;

    // calamine trims leading empty rows, so skip relative to where the range starts
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    parse_table(range.rows(), SKIP_ROWS.saturating_sub(first_row), years)
}

pub struct RbaSource {
    base_url: String,
    client: reqwest::Client,
    bank: BankInfo,
}

impl RbaSource {
    pub fn new(base_url: &str, client: reqwest::Client, bank: BankInfo) -> Self {
        RbaSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            bank,
        }
    }

    async fn fetch_range(&self, name: &str, years: &YearRange) -> Result<Vec<(NaiveDate, Decimal)>> {
        let url = format!("{}/{}.xls", self.base_url, name);
        let payload = fetch_bytes(&self.client, &url).await?;
        parse_workbook(&payload, years).with_context(|| format!("Failed to parse RBA range {name}"))
    }
}

#[async_trait]
impl RateSource for RbaSource {
    fn bank(&self) -> &BankInfo {
        &self.bank
    }

    #[instrument(name = "RbaFetch", skip_all, fields(years = %years))]
    async fn fetch(&self, years: YearRange) -> Result<Vec<RateRecord>> {
        let ranges: Vec<&str> = URL_RANGES
            .iter()
            .filter(|(_, start, end)| years.overlaps(*start, *end))
            .map(|(name, _, _)| *name)
            .collect();
        if ranges.is_empty() {
            info!("No RBA files cover {}", years);
            return Ok(Vec::new());
        }

        // ranges cover disjoint years, so they can be fetched together
        let futures = ranges.iter().map(|name| async move {
            let result = self.fetch_range(name, &years).await;
            (*name, result)
        });

        let mut pairs = Vec::new();
        let mut failures = Vec::new();
        for (name, result) in join_all(futures).await {
            match result {
                Ok(range_pairs) => {
                    info!("Got {} RBA rates from {}", range_pairs.len(), name);
                    pairs.extend(range_pairs);
                }
                Err(e) => {
                    warn!("Failed to fetch RBA range {}: {:#}", name, e);
                    failures.push(format!("{name}: {e:#}"));
                }
            }
        }

        if failures.len() == ranges.len() {
            return Err(anyhow!("All RBA downloads failed: {}", failures.join("; ")));
        }
        Ok(to_records(pairs, self.direction()))
    }
}
