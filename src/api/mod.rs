use async_trait::async_trait;
use std::time::Duration;

use crate::error::ProviderError;
use crate::models::RawHolderTable;

pub mod nasdaq_client;
pub mod yahoo_client;
pub use nasdaq_client::NasdaqClient;
pub use yahoo_client::YahooClient;

/// Simple rate limiter for API requests: a mandatory delay between calls
/// to stay under third-party limits.
pub struct ApiRateLimiter {
    delay_ms: u64,
}

impl ApiRateLimiter {
    pub fn new(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    pub async fn wait(&self) {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
    }
}

/// Price lookup collaborator. `Ok(None)` means the provider has no price
/// for the ticker; errors mean the provider itself failed.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn source_id(&self) -> &'static str;

    async fn latest_price(&self, ticker: &str) -> Result<Option<f64>, ProviderError>;
}

/// Holder-table fetch collaborator. `Ok(None)` means the provider returned
/// no usable holdings payload for the ticker (treated as zero records
/// downstream, never as a ticker failure).
#[async_trait]
pub trait HoldingsProvider: Send + Sync {
    fn source_id(&self) -> &'static str;

    async fn holder_table(&self, ticker: &str) -> Result<Option<RawHolderTable>, ProviderError>;
}
