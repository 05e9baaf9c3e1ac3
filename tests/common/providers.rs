//! In-process provider stubs for driving the scanner without a network.

use async_trait::async_trait;
use std::collections::HashMap;

use holdings_scanner::api::{HoldingsProvider, QuoteProvider};
use holdings_scanner::error::ProviderError;
use holdings_scanner::models::RawHolderTable;

/// Fixed price book; tickers missing from the map have no price.
pub struct StubQuotes {
    prices: HashMap<String, f64>,
}

impl StubQuotes {
    pub fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: prices
                .iter()
                .map(|(t, p)| (t.to_string(), *p))
                .collect(),
        }
    }
}

#[async_trait]
impl QuoteProvider for StubQuotes {
    fn source_id(&self) -> &'static str {
        "stub-quotes"
    }

    async fn latest_price(&self, ticker: &str) -> Result<Option<f64>, ProviderError> {
        Ok(self.prices.get(ticker).copied())
    }
}

/// Fixed holder tables; tickers missing from the map are "unavailable".
pub struct StubHoldings {
    source: &'static str,
    tables: HashMap<String, RawHolderTable>,
}

impl StubHoldings {
    pub fn new(source: &'static str, tables: Vec<(&str, RawHolderTable)>) -> Self {
        Self {
            source,
            tables: tables
                .into_iter()
                .map(|(t, table)| (t.to_string(), table))
                .collect(),
        }
    }
}

#[async_trait]
impl HoldingsProvider for StubHoldings {
    fn source_id(&self) -> &'static str {
        self.source
    }

    async fn holder_table(&self, ticker: &str) -> Result<Option<RawHolderTable>, ProviderError> {
        Ok(self.tables.get(ticker).cloned())
    }
}

/// A provider whose every fetch fails, for exercising the never-abort rule.
pub struct BrokenHoldings;

#[async_trait]
impl HoldingsProvider for BrokenHoldings {
    fn source_id(&self) -> &'static str {
        "broken"
    }

    async fn holder_table(&self, _ticker: &str) -> Result<Option<RawHolderTable>, ProviderError> {
        Err(ProviderError::Status {
            provider: "broken",
            status: 503,
        })
    }
}
