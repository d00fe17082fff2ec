//! Narodowy Bank Polski yearly table A archives.
//!
//! One semicolon separated file per year, Windows-1250 encoded, dates as
//! `YYYYMMDD` and the `1USD` column (third field) written with a decimal
//! comma.

use crate::core::bank::BankInfo;
use crate::core::normalize::{parse_date, parse_rate};
use crate::core::rate::{RateRecord, YearRange};
use crate::core::source::RateSource;
use crate::providers::util::{fetch_bytes, to_records};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use encoding_rs::WINDOWS_1250;
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};

/// Oldest year published in the archive format.
pub const FIRST_YEAR: i32 = 2012;

const SEPARATOR: char = ';';
const DATE_FORMATS: [&str; 1] = ["%Y%m%d"];
const DATE_COLUMN: usize = 0;
const USD_COLUMN: usize = 2;

pub struct NbpSource {
    base_url: String,
    client: reqwest::Client,
    bank: BankInfo,
}

impl NbpSource {
    pub fn new(base_url: &str, client: reqwest::Client, bank: BankInfo) -> Self {
        NbpSource {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            bank,
        }
    }

    fn year_url(&self, year: i32) -> String {
        format!("{}/archiwum_tab_a_{}.csv", self.base_url, year)
    }
}

/// Parses one yearly archive, dropping every row that is not a dated rate.
pub fn parse_archive(payload: &[u8], years: &YearRange) -> Vec<(NaiveDate, Decimal)> {
    let (content, _, had_errors) = WINDOWS_1250.decode(payload);
    if had_errors {
        debug!("NBP payload contained invalid Windows-1250 sequences");
    }

    content
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(SEPARATOR).collect();
            let date = parse_date(fields.get(DATE_COLUMN)?, &DATE_FORMATS)?;
            let rate = parse_rate(fields.get(USD_COLUMN)?, ',')?;
            Some((date, rate))
        })
        .filter(|(date, _)| years.contains(date.year()))
        .collect()
}

#[async_trait]
impl RateSource for NbpSource {
    fn bank(&self) -> &BankInfo {
        &self.bank
    }

    #[instrument(name = "NbpFetch", skip_all, fields(years = %years))]
    async fn fetch(&self, years: YearRange) -> Result<Vec<RateRecord>> {
        let Ok(available) = YearRange::new(years.start.max(FIRST_YEAR), years.end) else {
            info!("NBP archive starts in {}, nothing to fetch", FIRST_YEAR);
            return Ok(Vec::new());
        };

        let mut pairs = Vec::new();
        let mut failures = Vec::new();
        for year in available.years() {
            let url = self.year_url(year);
            match fetch_bytes(&self.client, &url).await {
                Ok(payload) => {
                    let year_pairs = parse_archive(&payload, &years);
                    info!("Got {} NBP rates for {}", year_pairs.len(), year);
                    pairs.extend(year_pairs);
                }
                Err(e) => {
                    warn!("Failed to fetch NBP rates for {}: {}", year, e);
                    failures.push(format!("{year}: {e}"));
                }
            }
        }

        if failures.len() == available.years().count() {
            return Err(anyhow!(
                "All NBP archive downloads failed: {}",
                failures.join("; ")
            ));
        }
        Ok(to_records(pairs, self.direction()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bank::Registry;
    use crate::providers::util::build_client;
    use std::str::FromStr;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE: &str = "data;1THB;1USD;1AUD\n\
        20240102;0,1143;3,9432;2,6810\n\
        20240103;0,1150;4,0015;2,6902\n\
        \n\
        kod ISO;THB;USD;AUD\n\
        nazwa waluty;bat (Tajlandia);dolar amerykański;dolar australijski\n";

    fn encode(text: &str) -> Vec<u8> {
        WINDOWS_1250.encode(text).0.into_owned()
    }

    fn year(y: i32) -> YearRange {
        YearRange::new(y, y).unwrap()
    }

    fn source(base_url: &str) -> NbpSource {
        let bank = Registry::standard().by_code("NBP").unwrap().clone();
        NbpSource::new(base_url, build_client(Duration::from_secs(5)).unwrap(), bank)
    }

    #[test]
    fn test_parse_archive_skips_trailer_rows() {
        let pairs = parse_archive(&encode(SAMPLE), &year(2024));
        assert_eq!(
            pairs,
            vec![
                (
                    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                    Decimal::from_str("3.9432").unwrap()
                ),
                (
                    NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                    Decimal::from_str("4.0015").unwrap()
                ),
            ]
        );
    }

    #[test]
    fn test_parse_archive_drops_non_numeric_rate() {
        let payload = "data;1THB;1USD\n20240102;0,1143;3,9432\n20240103;0,1150;brak\n";
        let pairs = parse_archive(&encode(payload), &year(2024));
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_parse_archive_filters_years() {
        let pairs = parse_archive(&encode(SAMPLE), &year(2023));
        assert!(pairs.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_years_and_tolerate_missing_year() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/archiwum_tab_a_2024.csv"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(encode(SAMPLE)))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/archiwum_tab_a_2025.csv"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let records = source(&mock_server.uri())
            .fetch(YearRange::new(2024, 2025).unwrap())
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.direction.to_string() == "USD_TO_PLN"));
    }

    #[tokio::test]
    async fn test_fetch_fails_when_every_year_fails() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let result = source(&mock_server.uri()).fetch(year(2024)).await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("All NBP archive downloads failed")
        );
    }

    #[tokio::test]
    async fn test_fetch_before_archive_start_is_empty() {
        let source = source("http://127.0.0.1:9");
        let records = source.fetch(YearRange::new(2005, 2010).unwrap()).await.unwrap();
        assert!(records.is_empty());
    }
}
