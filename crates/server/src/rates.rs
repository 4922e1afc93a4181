//! USD exchange rate lookup.
//!
//! The rate is fetched from the National Bank of Ukraine on every write that
//! needs it. A lookup never fails from the caller's point of view: any
//! problem with the remote service yields [`FALLBACK_USD_RATE`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

/// Rate used when the remote lookup is unusable.
pub const FALLBACK_USD_RATE: f64 = 38.0;
pub const NBU_USD_URL: &str =
    "https://bank.gov.ua/NBUStatService/v1/statdirectory/exchange?valcode=USD&json";

/// Source of the hryvnia-per-dollar rate.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn usd_rate(&self) -> f64;
}

/// Always answers with the same rate.
#[derive(Clone, Copy, Debug)]
pub struct FixedRate(pub f64);

#[async_trait]
impl RateSource for FixedRate {
    async fn usd_rate(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, thiserror::Error)]
enum RateError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("malformed response: {0}")]
    Malformed(&'static str),
}

#[derive(Debug, Deserialize)]
struct NbuRate {
    rate: f64,
}

/// Rate source backed by the NBU JSON endpoint (or anything answering with
/// the same `[{"rate": ...}]` shape).
#[derive(Clone, Debug)]
pub struct NbuRates {
    client: Client,
    url: String,
}

impl NbuRates {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    async fn fetch(&self) -> Result<f64, RateError> {
        let resp = self.client.get(&self.url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(RateError::Status(status));
        }

        let rates = resp.json::<Vec<NbuRate>>().await?;
        first_rate(&rates)
    }
}

#[async_trait]
impl RateSource for NbuRates {
    async fn usd_rate(&self) -> f64 {
        match self.fetch().await {
            Ok(rate) => {
                tracing::debug!("fetched usd rate {rate}");
                rate
            }
            Err(err) => {
                tracing::warn!("usd rate lookup failed, using {FALLBACK_USD_RATE}: {err}");
                FALLBACK_USD_RATE
            }
        }
    }
}

fn first_rate(rates: &[NbuRate]) -> Result<f64, RateError> {
    let rate = rates
        .first()
        .map(|r| r.rate)
        .ok_or(RateError::Malformed("empty rate list"))?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(RateError::Malformed("rate is not a positive number"));
    }
    Ok(rate)
}
