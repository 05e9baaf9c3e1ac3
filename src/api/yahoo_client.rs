//! Yahoo Finance client: latest price via the chart endpoint and
//! institutional holders via quoteSummary.
//!
//! Yahoo reports `pctHeld` as a 0-1 fraction; it is converted to the
//! canonical 0-100 scale here, at ingestion, so the engine never sees
//! mixed scales.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{HoldingsProvider, QuoteProvider};
use crate::error::ProviderError;
use crate::models::{RawFigure, RawHolderRow, RawHolderTable};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const SOURCE_ID: &str = "yahoo";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

pub struct YahooClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Option<Chart>,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Option<ChartMeta>,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: Option<QuoteSummary>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "institutionOwnership")]
    institution_ownership: Option<InstitutionOwnership>,
}

#[derive(Debug, Deserialize)]
struct InstitutionOwnership {
    #[serde(rename = "ownershipList")]
    ownership_list: Option<Vec<OwnershipEntry>>,
}

#[derive(Debug, Deserialize)]
struct OwnershipEntry {
    organization: Option<String>,
    #[serde(rename = "pctHeld")]
    pct_held: Option<FormattedValue>,
    #[serde(rename = "reportDate")]
    report_date: Option<FormattedDate>,
}

#[derive(Debug, Deserialize)]
struct FormattedValue {
    raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FormattedDate {
    fmt: Option<String>,
}

impl YahooClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different host; used by tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ProviderError> {
        Url::parse_with_params(&format!("{}{}", self.base_url, path), params).map_err(|e| {
            ProviderError::Decode {
                provider: SOURCE_ID,
                detail: format!("bad url: {e}"),
            }
        })
    }

    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ProviderError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: SOURCE_ID,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
            provider: SOURCE_ID,
            detail: e.to_string(),
        })
    }
}

#[async_trait]
impl QuoteProvider for YahooClient {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn latest_price(&self, ticker: &str) -> Result<Option<f64>, ProviderError> {
        let url = self.url(
            &format!("/v8/finance/chart/{ticker}"),
            &[("range", "1d"), ("interval", "1d")],
        )?;
        let payload: ChartResponse = self.fetch(url).await?;

        let price = payload
            .chart
            .and_then(|c| c.result)
            .and_then(|r| r.into_iter().next())
            .and_then(|r| r.meta)
            .and_then(|m| m.regular_market_price)
            .filter(|p| *p > 0.0);

        debug!(ticker, ?price, "fetched yahoo price");
        Ok(price)
    }
}

#[async_trait]
impl HoldingsProvider for YahooClient {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn holder_table(&self, ticker: &str) -> Result<Option<RawHolderTable>, ProviderError> {
        let url = self.url(
            &format!("/v10/finance/quoteSummary/{ticker}"),
            &[("modules", "institutionOwnership")],
        )?;
        let payload: QuoteSummaryResponse = self.fetch(url).await?;

        let entries = payload
            .quote_summary
            .and_then(|s| s.result)
            .and_then(|r| r.into_iter().next())
            .and_then(|r| r.institution_ownership)
            .and_then(|o| o.ownership_list)
            .unwrap_or_default();
        if entries.is_empty() {
            return Ok(None);
        }

        let mut table = RawHolderTable::new(SOURCE_ID);
        for entry in entries {
            let holder_name = match entry.organization {
                Some(name) => name,
                None => continue,
            };
            // 0-1 fraction to 0-100 percentage points.
            let percent_held = entry
                .pct_held
                .and_then(|v| v.raw)
                .map(|raw| RawFigure::Number(raw * 100.0));
            table.rows.push(RawHolderRow {
                holder_name,
                percent_held,
                shares_held: None,
                as_of_date: entry.report_date.and_then(|d| d.fmt),
            });
        }

        debug!(ticker, holders = table.rows.len(), "fetched yahoo holdings");
        Ok(Some(table))
    }
}
