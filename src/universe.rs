//! Ticker universe loading.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Parse a ticker list in either comma-separated or line-separated form.
/// Entries are trimmed, uppercased, and deduplicated preserving first
/// occurrence.
pub fn parse_ticker_list(content: &str) -> Vec<String> {
    let content = content.trim();
    let raw: Vec<&str> = if content.contains(',') {
        content.split(',').collect()
    } else {
        content.lines().collect()
    };

    let mut seen = std::collections::BTreeSet::new();
    raw.iter()
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Load the requested universe from a ticker file.
pub fn load_tickers(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("could not read ticker file {}", path.display()))?;

    let tickers = parse_ticker_list(&content);
    info!("📊 Loaded {} tickers from {}", tickers.len(), path.display());
    Ok(tickers)
}
