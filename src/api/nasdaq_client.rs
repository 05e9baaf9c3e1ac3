//! Nasdaq institutional-holdings client.
//!
//! The endpoint reports holder rows as share counts with thousands
//! separators, plus a shares-outstanding total quoted in millions. Both
//! are passed through as raw figures; the millions unit is resolved here
//! because it is provider knowledge, not engine knowledge.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::HoldingsProvider;
use crate::engine::normalizer::parse_numeric;
use crate::error::ProviderError;
use crate::models::{RawFigure, RawHolderRow, RawHolderTable};

const DEFAULT_BASE_URL: &str = "https://api.nasdaq.com";
const SOURCE_ID: &str = "nasdaq";

// Nasdaq rejects requests without a browser-looking user agent.
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

pub struct NasdaqClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HoldingsResponse {
    data: Option<HoldingsData>,
    status: Option<ResponseStatus>,
}

#[derive(Debug, Deserialize)]
struct ResponseStatus {
    #[serde(rename = "rCode")]
    r_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct HoldingsData {
    #[serde(rename = "holdingsTransactions")]
    holdings_transactions: Option<HoldingsTransactions>,
    #[serde(rename = "ownershipSummary")]
    ownership_summary: Option<OwnershipSummary>,
}

#[derive(Debug, Deserialize)]
struct HoldingsTransactions {
    table: Option<HoldingsTable>,
}

#[derive(Debug, Deserialize)]
struct HoldingsTable {
    rows: Option<Vec<HoldingRow>>,
}

#[derive(Debug, Deserialize)]
struct HoldingRow {
    #[serde(rename = "ownerName")]
    owner_name: Option<String>,
    #[serde(rename = "sharesHeld")]
    shares_held: Option<String>,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwnershipSummary {
    #[serde(rename = "ShareoutstandingTotal")]
    shares_outstanding_total: Option<SummaryValue>,
}

#[derive(Debug, Deserialize)]
struct SummaryValue {
    value: Option<String>,
}

impl NasdaqClient {
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

    fn holdings_url(&self, ticker: &str) -> Result<Url, ProviderError> {
        let endpoint = format!(
            "{}/api/company/{}/institutional-holdings",
            self.base_url, ticker
        );
        Url::parse_with_params(
            &endpoint,
            &[
                ("limit", "50"),
                ("type", "TOTAL"),
                ("sortColumn", "marketValue"),
            ],
        )
        .map_err(|e| ProviderError::Decode {
            provider: SOURCE_ID,
            detail: format!("bad url: {e}"),
        })
    }
}

#[async_trait]
impl HoldingsProvider for NasdaqClient {
    fn source_id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn holder_table(&self, ticker: &str) -> Result<Option<RawHolderTable>, ProviderError> {
        let url = self.holdings_url(ticker)?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status {
                provider: SOURCE_ID,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let payload: HoldingsResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
                provider: SOURCE_ID,
                detail: e.to_string(),
            })?;

        if let Some(code) = payload.status.and_then(|s| s.r_code) {
            if code != 200 {
                debug!(ticker, code, "nasdaq reported an unsuccessful payload");
                return Ok(None);
            }
        }

        let data = match payload.data {
            Some(data) => data,
            None => return Ok(None),
        };

        let rows = data
            .holdings_transactions
            .and_then(|t| t.table)
            .and_then(|t| t.rows)
            .unwrap_or_default();
        if rows.is_empty() {
            return Ok(None);
        }

        let mut table = RawHolderTable::new(SOURCE_ID);
        // The summary total is quoted in millions of shares.
        table.total_shares_outstanding = data
            .ownership_summary
            .and_then(|s| s.shares_outstanding_total)
            .and_then(|v| v.value)
            .and_then(|text| parse_numeric(&RawFigure::Text(text)))
            .map(|millions| RawFigure::Number(millions * 1_000_000.0));

        for row in rows {
            let holder_name = match row.owner_name {
                Some(name) => name,
                None => continue,
            };
            table.rows.push(RawHolderRow {
                holder_name,
                percent_held: None,
                shares_held: row.shares_held.map(RawFigure::Text),
                as_of_date: row.date,
            });
        }

        debug!(ticker, holders = table.rows.len(), "fetched nasdaq holdings");
        Ok(Some(table))
    }
}
