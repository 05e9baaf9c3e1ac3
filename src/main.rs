use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

use holdings_scanner::api::{HoldingsProvider, NasdaqClient, YahooClient};
use holdings_scanner::models::Config;
use holdings_scanner::report::{self, ScanReport};
use holdings_scanner::scan_state::{ScanState, ScanStateStore};
use holdings_scanner::scanner::Scanner;
use holdings_scanner::universe;

/// Scan low-priced stocks for BlackRock and Vanguard ownership,
/// cross-validated across providers and ranked into priority tiers.
#[derive(Debug, Parser)]
#[command(name = "holdings-scanner", version)]
struct Cli {
    /// Ticker list file (comma- or line-separated)
    #[arg(long)]
    tickers: Option<String>,

    /// Processed-tickers state file
    #[arg(long)]
    state_file: Option<String>,

    /// Results document output path
    #[arg(long)]
    results_file: Option<String>,

    /// Rescan the full universe, ignoring prior state
    #[arg(long)]
    full: bool,

    /// Exclusive upper price bound in dollars
    #[arg(long)]
    price_ceiling: Option<f64>,

    /// Minimum holding threshold in percentage points (0-100 scale)
    #[arg(long)]
    min_holding: Option<f64>,

    /// Require every tracked holder to meet the threshold
    #[arg(long)]
    require_all: bool,

    /// Delay between provider requests in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Suppress the tier-grouped results listing
    #[arg(long)]
    quiet: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut Config) {
        if let Some(tickers) = &self.tickers {
            config.ticker_file = tickers.clone();
        }
        if let Some(state_file) = &self.state_file {
            config.state_file = state_file.clone();
        }
        if let Some(results_file) = &self.results_file {
            config.results_file = results_file.clone();
        }
        if let Some(price_ceiling) = self.price_ceiling {
            config.price_ceiling = price_ceiling;
        }
        if let Some(min_holding) = self.min_holding {
            config.min_holding_pct = min_holding;
        }
        if self.require_all {
            config.require_all_holders = true;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.request_delay_ms = delay_ms;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("holdings_scanner=info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    let cli = Cli::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("❌ Configuration error: {e}");
            std::process::exit(1);
        }
    };
    cli.apply_to(&mut config);

    println!("🎯 INSTITUTIONAL OWNERSHIP SCANNER");
    println!("{}", "=".repeat(40));
    let mode = if config.require_all_holders { "BOTH" } else { "EITHER" };
    println!(
        "🔍 Minimum: {:.1}% held by {} of BlackRock / Vanguard",
        config.min_holding_pct, mode
    );
    println!("💰 Max price: ${:.2}", config.price_ceiling);

    let tickers = match universe::load_tickers(&config.ticker_file) {
        Ok(tickers) => tickers,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    if tickers.is_empty() {
        println!("❌ No tickers to process");
        return Ok(());
    }

    let store = ScanStateStore::new(&config.state_file);
    let prior_state = store.load();
    println!("📁 Previously processed: {} stocks", prior_state.len());

    let plan = if cli.full {
        ScanState::default().plan(&tickers)
    } else {
        prior_state.plan(&tickers)
    };
    if plan.incremental {
        println!(
            "🆕 Incremental scan: {} new out of {} requested",
            plan.tickers.len(),
            tickers.len()
        );
    } else {
        println!("📊 Full scan: {} stocks", plan.tickers.len());
    }

    let yahoo = Arc::new(YahooClient::new()?);
    let nasdaq = Arc::new(NasdaqClient::new()?);
    let holdings: Vec<Arc<dyn HoldingsProvider>> = vec![nasdaq, yahoo.clone()];
    let scanner = Scanner::new(yahoo, holdings, &config);

    let outcome = scanner.run(&plan, prior_state).await;

    if !cli.quiet {
        report::display_results(&outcome);
    }

    let scan_report = ScanReport::from_outcome(&outcome);
    if let Err(e) = scan_report.write_to(&config.results_file) {
        eprintln!("⚠️ Could not write results: {e}");
    } else {
        println!("✅ Results saved to {}", config.results_file);
    }

    store.save(&outcome.state)?;

    println!(
        "\n📊 SCAN COMPLETE: {} processed, {} qualified",
        outcome.summary.total_processed, outcome.summary.qualifying_count
    );

    Ok(())
}
