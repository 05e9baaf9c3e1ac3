use thiserror::Error;

/// Failure classes for the data provider layer.
///
/// Every variant is recoverable from the scanner's point of view: a failed
/// fetch is treated as "source unavailable" for that ticker and never
/// aborts the batch.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {provider}")]
    Status { provider: &'static str, status: u16 },

    #[error("malformed response from {provider}: {detail}")]
    Decode { provider: &'static str, detail: String },
}
