use crate::core::rate::{QuoteDirection, RateRecord};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::debug;

pub const USER_AGENT: &str = "fxarchive/0.1";

/// One client per run. The timeout covers the whole request, so a stalled
/// download fails the source instead of hanging the run.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}

/// Downloads `url`, failing on transport errors and non-success statuses.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    debug!("Requesting {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| anyhow!("Request error: {} URL: {}", e, url))?;

    if !response.status().is_success() {
        return Err(anyhow!("HTTP error: {} URL: {}", response.status(), url));
    }

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read response body from {url}"))?;
    debug!("Received {} bytes from {}", bytes.len(), url);
    Ok(bytes.to_vec())
}

/// Attaches the source's quote direction to parsed pairs.
pub fn to_records(pairs: Vec<(NaiveDate, Decimal)>, direction: &QuoteDirection) -> Vec<RateRecord> {
    pairs
        .into_iter()
        .map(|(date, rate)| RateRecord {
            date,
            rate,
            direction: direction.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_bytes_rejects_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.csv"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let url = format!("{}/missing.csv", mock_server.uri());
        let err = fetch_bytes(&client, &url).await.unwrap_err();
        assert!(err.to_string().starts_with("HTTP error: 404"));
    }

    #[tokio::test]
    async fn test_fetch_bytes_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.csv"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&mock_server)
            .await;

        let client = build_client(Duration::from_millis(50)).unwrap();
        let url = format!("{}/slow.csv", mock_server.uri());
        assert!(fetch_bytes(&client, &url).await.is_err());
    }
}
