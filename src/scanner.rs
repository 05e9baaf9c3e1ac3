//! Scan orchestration: price gate, holdings fetches, reconciliation,
//! screening, and final ranking for a planned batch of tickers.
//!
//! Fetches are serialized with a mandatory delay between provider calls.
//! No failure here is fatal to the batch: a dead provider or a bad payload
//! costs at most the data it would have contributed.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{ApiRateLimiter, HoldingsProvider, QuoteProvider};
use crate::engine::normalizer::{normalize_table, NormalizedSource};
use crate::engine::{eligibility, ranking, reconciler, ScreenCriteria};
use crate::models::{Config, RankedSecurity, ScanSummary};
use crate::scan_state::{ScanPlan, ScanState};

/// Everything one scan run produces: the ordered qualifying list, the
/// summary counters, and the updated cross-run state to persist.
#[derive(Debug)]
pub struct ScanOutcome {
    pub ranked: Vec<RankedSecurity>,
    pub summary: ScanSummary,
    pub state: ScanState,
    /// Carried over from the plan so presentation can tell "no new
    /// matches" apart from "no matches at all".
    pub incremental: bool,
}

pub struct Scanner {
    quotes: Arc<dyn QuoteProvider>,
    holdings: Vec<Arc<dyn HoldingsProvider>>,
    criteria: ScreenCriteria,
    under_price_mark: f64,
    limiter: ApiRateLimiter,
}

impl Scanner {
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        holdings: Vec<Arc<dyn HoldingsProvider>>,
        config: &Config,
    ) -> Self {
        Self {
            quotes,
            holdings,
            criteria: ScreenCriteria::from(config),
            under_price_mark: config.under_price_mark,
            limiter: ApiRateLimiter::new(config.request_delay_ms),
        }
    }

    /// Run the planned batch. Each ticker is fully processed (or skipped
    /// for lack of data) before it is recorded in the state, so an abort
    /// mid-batch never marks partial work as done.
    pub async fn run(&self, plan: &ScanPlan, prior_state: ScanState) -> ScanOutcome {
        let mut state = prior_state;
        let mut survivors = Vec::new();
        let mut total_processed = 0usize;
        let mut no_price_data = 0usize;

        info!("📊 Scanning {} tickers", plan.tickers.len());

        for (index, ticker) in plan.tickers.iter().enumerate() {
            if index > 0 {
                self.limiter.wait().await;
            }

            total_processed += 1;

            let price = match self.quotes.latest_price(ticker).await {
                Ok(price) => price,
                Err(e) => {
                    warn!(%ticker, error = %e, "price lookup failed");
                    None
                }
            };

            let price = match price {
                None => {
                    debug!(%ticker, "no price data, excluded from batch");
                    no_price_data += 1;
                    state.mark_processed(ticker);
                    continue;
                }
                // Priced out: no point fetching holder tables.
                Some(p) if p >= self.criteria.price_ceiling => {
                    debug!(%ticker, price = p, "above price ceiling");
                    state.mark_processed(ticker);
                    continue;
                }
                Some(p) => p,
            };

            let sources = self.fetch_holdings(ticker).await;
            let snapshot = reconciler::build_snapshot(
                ticker,
                Some(price),
                &sources,
                self.criteria.discrepancy_tolerance,
            );

            if eligibility::is_eligible(&snapshot, &self.criteria) {
                info!(
                    "✅ {:6} ${:.2} | BR:{:.1}% VG:{:.1}% [tier {}]",
                    ticker,
                    price,
                    snapshot.blackrock_pct(),
                    snapshot.vanguard_pct(),
                    ranking::classify_tier(&snapshot),
                );
                survivors.push(snapshot);
            } else {
                debug!(
                    %ticker,
                    blackrock = snapshot.blackrock_pct(),
                    vanguard = snapshot.vanguard_pct(),
                    "below holding criteria"
                );
            }

            state.mark_processed(ticker);

            if (index + 1) % 20 == 0 {
                info!(
                    "⏳ Progress: {}/{} | {} matches",
                    index + 1,
                    plan.tickers.len(),
                    survivors.len()
                );
            }
        }

        // Ranking needs the full qualifying set, so it runs only after
        // every snapshot is materialized.
        let ranked = ranking::rank(survivors);
        let summary = self.summarize(&ranked, total_processed, no_price_data);

        info!(
            "📊 Scan complete: {} processed, {} qualified",
            summary.total_processed, summary.qualifying_count
        );

        ScanOutcome {
            ranked,
            summary,
            state,
            incremental: plan.incremental,
        }
    }

    /// Fetch and normalize every holdings source for one ticker. An
    /// unavailable or failing source contributes nothing.
    async fn fetch_holdings(&self, ticker: &str) -> Vec<NormalizedSource> {
        let mut sources = Vec::new();

        for provider in &self.holdings {
            self.limiter.wait().await;
            match provider.holder_table(ticker).await {
                Ok(Some(table)) => {
                    let normalized = normalize_table(&table);
                    if normalized.defaulted_rows > 0 {
                        debug!(
                            ticker,
                            source = provider.source_id(),
                            defaulted = normalized.defaulted_rows,
                            "some holder rows were unparseable"
                        );
                    }
                    sources.push(normalized);
                }
                Ok(None) => {
                    debug!(ticker, source = provider.source_id(), "no holdings payload");
                }
                Err(e) => {
                    warn!(ticker, source = provider.source_id(), error = %e, "holdings fetch failed");
                }
            }
        }

        sources
    }

    fn summarize(
        &self,
        ranked: &[RankedSecurity],
        total_processed: usize,
        no_price_data: usize,
    ) -> ScanSummary {
        let tier_count = |tier: u8| ranked.iter().filter(|r| r.tier == tier).count();

        ScanSummary {
            total_processed,
            qualifying_count: ranked.len(),
            high_tier: tier_count(1),
            medium_tier: tier_count(2),
            low_tier: tier_count(3),
            under_dollar: ranked
                .iter()
                .filter(|r| r.snapshot.price.is_some_and(|p| p < self.under_price_mark))
                .count(),
            premium_count: ranked.iter().filter(|r| r.premium).count(),
            no_price_data,
        }
    }
}
