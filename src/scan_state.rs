//! Cross-run scan state: which tickers have already been processed.
//!
//! The state is an explicit value loaded before a scan and saved after it;
//! the engine only computes the delta and the updated set. A ticker is
//! recorded once it has been fully processed, whether or not it qualified,
//! and is never rescanned by this mechanism.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Set of previously processed tickers, persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanState {
    /// Set semantics: a ticker appears at most once however often it is
    /// scanned. Serialized under the key the dashboard already reads.
    #[serde(rename = "stocks")]
    pub processed_tickers: BTreeSet<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Which tickers this run should actually scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPlan {
    pub tickers: Vec<String>,
    /// True when prior state let us skip already-processed tickers, so
    /// presentation can distinguish "no new matches" from "no matches".
    pub incremental: bool,
}

impl ScanState {
    pub fn is_empty(&self) -> bool {
        self.processed_tickers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.processed_tickers.len()
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.processed_tickers.contains(ticker)
    }

    /// Decide between a full and an incremental scan of the requested
    /// universe. Empty prior state, or prior state that overlaps none of
    /// the requested tickers, means a full scan; otherwise only the
    /// tickers not yet processed are scanned and the run is flagged
    /// incremental. The universe is deduplicated preserving order.
    pub fn plan(&self, universe: &[String]) -> ScanPlan {
        let mut seen = BTreeSet::new();
        let requested: Vec<String> = universe
            .iter()
            .filter(|t| seen.insert(t.to_string()))
            .cloned()
            .collect();

        let fresh: Vec<String> = requested
            .iter()
            .filter(|t| !self.contains(t))
            .cloned()
            .collect();

        let incremental = !self.is_empty() && fresh.len() < requested.len();

        ScanPlan {
            tickers: fresh,
            incremental,
        }
    }

    /// Record one fully processed ticker. Callers invoke this only after
    /// the ticker's snapshot work completed, so an aborted batch never
    /// records partial work.
    pub fn mark_processed(&mut self, ticker: &str) {
        self.processed_tickers.insert(ticker.to_string());
        self.last_updated = Some(Utc::now());
    }
}

/// JSON-file persistence for [`ScanState`].
pub struct ScanStateStore {
    path: PathBuf,
}

impl ScanStateStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load prior state. A missing file is a first run; a corrupt file is
    /// logged and treated as empty rather than failing the scan.
    pub fn load(&self) -> ScanState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => {
                debug!(path = %self.path.display(), "no prior scan state, starting fresh");
                return ScanState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not parse scan state, starting fresh");
                ScanState::default()
            }
        }
    }

    pub fn save(&self, state: &ScanState) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(state)?;
        std::fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), tickers = state.len(), "saved scan state");
        Ok(())
    }
}
