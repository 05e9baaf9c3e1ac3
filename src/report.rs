//! Presentation: the tier-grouped console view and the JSON results
//! document consumed by the dashboard.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::models::{DataQuality, HolderCategory, RankedSecurity, ScanSummary};
use crate::scanner::ScanOutcome;

/// One qualifying stock, flattened for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    pub ticker: String,
    pub price: f64,
    pub blackrock_pct: f64,
    pub vanguard_pct: f64,
    pub blackrock_source: Option<String>,
    pub vanguard_source: Option<String>,
    pub blackrock_discrepancy: f64,
    pub vanguard_discrepancy: f64,
    pub data_quality: DataQuality,
    pub tier: u8,
    pub premium: bool,
}

impl From<&RankedSecurity> for ReportEntry {
    fn from(ranked: &RankedSecurity) -> Self {
        let snapshot = &ranked.snapshot;
        let source_of = |category: HolderCategory| {
            snapshot
                .figures
                .get(&category)
                .and_then(|f| f.source.clone())
        };
        let gap_of = |category: HolderCategory| {
            snapshot.discrepancy.get(&category).copied().unwrap_or(0.0)
        };

        Self {
            ticker: snapshot.ticker.clone(),
            price: snapshot.price.unwrap_or(0.0),
            blackrock_pct: snapshot.blackrock_pct(),
            vanguard_pct: snapshot.vanguard_pct(),
            blackrock_source: source_of(HolderCategory::Blackrock),
            vanguard_source: source_of(HolderCategory::Vanguard),
            blackrock_discrepancy: gap_of(HolderCategory::Blackrock),
            vanguard_discrepancy: gap_of(HolderCategory::Vanguard),
            data_quality: snapshot.data_quality,
            tier: ranked.tier,
            premium: ranked.premium,
        }
    }
}

/// The full results document written after every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub stocks: Vec<ReportEntry>,
    pub summary: ScanSummary,
    pub timestamp: DateTime<Utc>,
    pub new_stocks_only: bool,
}

impl ScanReport {
    pub fn from_outcome(outcome: &ScanOutcome) -> Self {
        Self {
            stocks: outcome.ranked.iter().map(ReportEntry::from).collect(),
            summary: outcome.summary.clone(),
            timestamp: Utc::now(),
            new_stocks_only: outcome.incremental,
        }
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        debug!(path = %path.as_ref().display(), stocks = self.stocks.len(), "wrote results document");
        Ok(())
    }
}

/// Print the tier-grouped results the way the scanner always has.
pub fn display_results(outcome: &ScanOutcome) {
    if outcome.ranked.is_empty() {
        if outcome.incremental {
            println!("\n✅ No new stocks matched the criteria");
        } else {
            println!("\n❌ No stocks found matching criteria");
        }
        return;
    }

    println!("\n🎯 FOUND {} QUALIFYING STOCKS", outcome.ranked.len());
    println!("{}", "=".repeat(60));

    let in_tier = |tier: u8| -> Vec<&RankedSecurity> {
        outcome.ranked.iter().filter(|r| r.tier == tier).collect()
    };
    let high = in_tier(1);
    let medium = in_tier(2);
    let low = in_tier(3);

    if !high.is_empty() {
        println!("\n🔥 HIGH PRIORITY - both holders 4%+ ({} stocks):", high.len());
        for stock in &high {
            let snapshot = &stock.snapshot;
            let combined = snapshot.combined_pct();
            let marker = if stock.premium {
                "🔥🔥🔥🔥🔥"
            } else if snapshot.blackrock_pct() >= 5.0 && snapshot.vanguard_pct() >= 5.0 {
                "🔥🔥🔥"
            } else {
                "🔥"
            };
            println!(
                "  {:6} ${:5.2} | BR:{:4.1}% + VG:{:4.1}% = {:5.1}% {}",
                snapshot.ticker,
                snapshot.price.unwrap_or(0.0),
                snapshot.blackrock_pct(),
                snapshot.vanguard_pct(),
                combined,
                marker
            );
        }

        let premium: Vec<&RankedSecurity> =
            high.iter().filter(|r| r.premium).copied().collect();
        if !premium.is_empty() {
            println!(
                "\n🌟 PREMIUM DEALS: {} stocks with both holders 5%+ under $1",
                premium.len()
            );
            println!("   {}", join_tickers(premium.iter().copied()));
        }
    }

    if !medium.is_empty() {
        println!("\n📊 MEDIUM PRIORITY - one holder 3%+ ({} stocks):", medium.len());
        for stock in &medium {
            print_plain_row(stock);
        }
    }

    if !low.is_empty() {
        println!("\n⚠️ LOW PRIORITY - other ({} stocks):", low.len());
        for stock in &low {
            print_plain_row(stock);
        }
    }

    println!("\n📋 TICKER LISTS:");
    println!("{}", "-".repeat(30));
    if !high.is_empty() {
        println!("HIGH:   {}", join_tickers(high.iter().copied()));
    }
    if !medium.is_empty() {
        println!("MEDIUM: {}", join_tickers(medium.iter().copied()));
    }
    let under_dollar: Vec<&RankedSecurity> = outcome
        .ranked
        .iter()
        .filter(|r| r.snapshot.price.is_some_and(|p| p < 1.0))
        .collect();
    if !under_dollar.is_empty() {
        println!("<$1.00: {}", join_tickers(under_dollar.iter().copied()));
    }
    println!("ALL:    {}", join_tickers(outcome.ranked.iter()));

    let quality_count = |quality: DataQuality| {
        outcome
            .ranked
            .iter()
            .filter(|r| r.snapshot.data_quality == quality)
            .count()
    };
    println!("\n📊 DATA QUALITY:");
    println!("🔥 High (validated):    {}", quality_count(DataQuality::High));
    println!("📊 Medium (discrepancy): {}", quality_count(DataQuality::Medium));
    println!("⚠️ Low (no data):        {}", quality_count(DataQuality::Low));

    println!("{}", "=".repeat(60));
}

fn print_plain_row(stock: &RankedSecurity) {
    let snapshot = &stock.snapshot;
    println!(
        "  {:6} ${:5.2} | BR:{:4.1}% VG:{:4.1}%",
        snapshot.ticker,
        snapshot.price.unwrap_or(0.0),
        snapshot.blackrock_pct(),
        snapshot.vanguard_pct(),
    );
}

fn join_tickers<'a>(stocks: impl Iterator<Item = &'a RankedSecurity>) -> String {
    stocks
        .map(|r| r.snapshot.ticker.as_str())
        .collect::<Vec<_>>()
        .join(",")
}
