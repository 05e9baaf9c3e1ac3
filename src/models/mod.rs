use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Institutional holder classes tracked by the scanner.
///
/// `Other` keeps classification total; records in that bucket are retained
/// by the normalizer but never feed eligibility or ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HolderCategory {
    Blackrock,
    Vanguard,
    Other,
}

impl HolderCategory {
    /// Categories that participate in screening and ranking.
    pub const TRACKED: [HolderCategory; 2] = [HolderCategory::Blackrock, HolderCategory::Vanguard];

    /// Classify a free-text holder name. Case-insensitive and total:
    /// every name lands in exactly one category.
    pub fn classify(holder_name: &str) -> Self {
        let name = holder_name.to_uppercase();
        if name.contains("BLACKROCK") || name.contains("BLACK ROCK") {
            HolderCategory::Blackrock
        } else if name.contains("VANGUARD") {
            HolderCategory::Vanguard
        } else {
            HolderCategory::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HolderCategory::Blackrock => "BlackRock",
            HolderCategory::Vanguard => "Vanguard",
            HolderCategory::Other => "Other",
        }
    }
}

impl std::fmt::Display for HolderCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A numeric field as a provider reports it: already numeric, or text that
/// may carry thousands separators or a trailing percent sign.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFigure {
    Number(f64),
    Text(String),
}

impl From<f64> for RawFigure {
    fn from(value: f64) -> Self {
        RawFigure::Number(value)
    }
}

impl From<&str> for RawFigure {
    fn from(value: &str) -> Self {
        RawFigure::Text(value.to_string())
    }
}

/// One row of a provider's holder table, untouched apart from transport
/// decoding. Either `percent_held` or `shares_held` may be present.
#[derive(Debug, Clone)]
pub struct RawHolderRow {
    pub holder_name: String,
    /// Percent of shares outstanding on the 0-100 scale, when the provider
    /// reports percentages directly.
    pub percent_held: Option<RawFigure>,
    /// Absolute shares held, when the provider reports share counts.
    pub shares_held: Option<RawFigure>,
    /// Provider-formatted filing date text.
    pub as_of_date: Option<String>,
}

/// A full holder table from one provider for one security.
#[derive(Debug, Clone)]
pub struct RawHolderTable {
    /// Opaque identifier of the originating provider ("nasdaq", "yahoo", ...).
    pub source: String,
    pub rows: Vec<RawHolderRow>,
    /// Total shares outstanding, needed to turn share counts into
    /// percentages. Absent or unparseable totals yield zero percentages.
    pub total_shares_outstanding: Option<RawFigure>,
}

impl RawHolderTable {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            rows: Vec::new(),
            total_shares_outstanding: None,
        }
    }
}

/// One canonical ownership data point from one source. Percentages are
/// always on the 0-100 scale past this point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderRecord {
    pub category: HolderCategory,
    pub percent_of_shares: f64,
    pub as_of_date: Option<NaiveDate>,
    pub source: String,
}

/// Cross-source best estimate for one holder category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledFigure {
    pub percent: f64,
    /// Source that reported the winning (highest) figure; `None` when no
    /// source reported this category at all.
    pub source: Option<String>,
    pub as_of_date: Option<NaiveDate>,
}

impl ReconciledFigure {
    pub fn absent() -> Self {
        Self {
            percent: 0.0,
            source: None,
            as_of_date: None,
        }
    }
}

/// Advisory confidence signal describing cross-source agreement. Never an
/// eligibility criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    High,
    Medium,
    Low,
}

impl DataQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataQuality::High => "high",
            DataQuality::Medium => "medium",
            DataQuality::Low => "low",
        }
    }
}

/// Per-ticker reconciled view of price and institutional ownership.
/// Built once per scan and never mutated after reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecuritySnapshot {
    pub ticker: String,
    pub price: Option<f64>,
    /// Reconciled figure per tracked category. Both tracked categories are
    /// always present; an unreported category carries a zero figure.
    pub figures: BTreeMap<HolderCategory, ReconciledFigure>,
    pub data_quality: DataQuality,
    /// Absolute percentage-point gap between the two highest-reporting
    /// sources, per category. Zero for single-source or agreeing data.
    pub discrepancy: BTreeMap<HolderCategory, f64>,
}

impl SecuritySnapshot {
    pub fn percent_for(&self, category: HolderCategory) -> f64 {
        self.figures.get(&category).map_or(0.0, |f| f.percent)
    }

    pub fn blackrock_pct(&self) -> f64 {
        self.percent_for(HolderCategory::Blackrock)
    }

    pub fn vanguard_pct(&self) -> f64 {
        self.percent_for(HolderCategory::Vanguard)
    }

    pub fn combined_pct(&self) -> f64 {
        self.blackrock_pct() + self.vanguard_pct()
    }

    /// True when any tracked category has a non-zero reconciled figure.
    pub fn has_any_holdings(&self) -> bool {
        HolderCategory::TRACKED
            .iter()
            .any(|c| self.percent_for(*c) > 0.0)
    }
}

/// A qualifying security with its priority tier. Exists only inside one
/// scan's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSecurity {
    pub snapshot: SecuritySnapshot,
    /// 1 = highest priority, 3 = lowest.
    pub tier: u8,
    /// Presentation aid: Tier 1 with both holders at 5%+ under $1.
    /// Never changes tier or order.
    pub premium: bool,
}

/// Summary counters for one scan, in the shape the dashboard consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_processed: usize,
    pub qualifying_count: usize,
    pub high_tier: usize,
    pub medium_tier: usize,
    pub low_tier: usize,
    pub under_dollar: usize,
    pub premium_count: usize,
    pub no_price_data: usize,
}

/// Configuration for the scanner, loaded from environment variables with
/// defaults and overridable from the command line.
#[derive(Debug, Clone)]
pub struct Config {
    /// Exclusive upper price bound in dollars.
    pub price_ceiling: f64,
    /// Minimum holding threshold in percentage points (0-100 scale).
    pub min_holding_pct: f64,
    /// true = every tracked holder must meet the threshold; false = any one.
    pub require_all_holders: bool,
    /// Cross-source gap (percentage points) beyond which quality drops to
    /// medium.
    pub discrepancy_tolerance: f64,
    /// Sub-threshold used for the under-price summary bucket.
    pub under_price_mark: f64,
    /// Delay between provider requests, in milliseconds.
    pub request_delay_ms: u64,
    pub ticker_file: String,
    pub state_file: String,
    pub results_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            price_ceiling: 2.0,
            min_holding_pct: 4.0,
            require_all_holders: false,
            discrepancy_tolerance: 1.0,
            under_price_mark: 1.0,
            request_delay_ms: 500,
            ticker_file: "tickers.txt".to_string(),
            state_file: "processed_stocks.json".to_string(),
            results_file: "scan_results.json".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let defaults = Config::default();
        Ok(Config {
            price_ceiling: env_parse("SCANNER_PRICE_CEILING", defaults.price_ceiling),
            min_holding_pct: env_parse("SCANNER_MIN_HOLDING_PCT", defaults.min_holding_pct),
            require_all_holders: env_parse("SCANNER_REQUIRE_ALL", defaults.require_all_holders),
            discrepancy_tolerance: env_parse(
                "SCANNER_DISCREPANCY_TOLERANCE",
                defaults.discrepancy_tolerance,
            ),
            under_price_mark: env_parse("SCANNER_UNDER_PRICE_MARK", defaults.under_price_mark),
            request_delay_ms: env_parse("SCANNER_REQUEST_DELAY_MS", defaults.request_delay_ms),
            ticker_file: std::env::var("SCANNER_TICKER_FILE").unwrap_or(defaults.ticker_file),
            state_file: std::env::var("SCANNER_STATE_FILE").unwrap_or(defaults.state_file),
            results_file: std::env::var("SCANNER_RESULTS_FILE").unwrap_or(defaults.results_file),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
