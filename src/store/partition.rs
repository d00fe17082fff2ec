use crate::core::normalize::parse_rate;
use crate::core::rate::{QuoteDirection, RateRecord};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const HEADER: [&str; 3] = ["date", "rate", "direction"];

/// Reads one partition file. Rows that do not parse are skipped.
pub fn read(path: &Path) -> Result<Vec<RateRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open partition: {}", path.display()))?;

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let parsed = row.ok().and_then(|row| {
            let date = NaiveDate::parse_from_str(row.get(0)?.trim(), "%Y-%m-%d").ok()?;
            let rate = parse_rate(row.get(1)?, '.')?;
            let direction = row.get(2)?.parse::<QuoteDirection>().ok()?;
            Some(RateRecord {
                date,
                rate,
                direction,
            })
        });
        match parsed {
            Some(record) => records.push(record),
            None => debug!("Skipping malformed row {} in {}", line + 2, path.display()),
        }
    }
    Ok(records)
}

/// Replaces the partition at `path` with `rows`, which must already be in
/// ascending date order. The file is written beside the target and renamed
/// over it so an interrupted write never leaves a truncated partition.
pub fn write(path: &Path, direction: &QuoteDirection, rows: &[(NaiveDate, Decimal)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let tmp_path = path.with_extension("csv.tmp");
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_path(&tmp_path)
            .with_context(|| format!("Failed to create partition: {}", tmp_path.display()))?;

        writer.write_record(HEADER)?;
        let direction = direction.to_string();
        for (date, rate) in rows {
            writer.write_record([
                date.format("%Y-%m-%d").to_string(),
                rate.to_string(),
                direction.clone(),
            ])?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write partition: {}", tmp_path.display()))?;
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to replace partition: {}", path.display()))?;
    Ok(())
}
