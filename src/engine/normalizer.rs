//! Holder record normalization.
//!
//! Turns one provider's raw holder table into canonical per-category
//! records on the 0-100 percent scale. Malformed rows degrade to zero
//! figures and are counted, never propagated as errors: one bad filing row
//! must not cost the whole table.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

use crate::models::{HolderCategory, HolderRecord, RawFigure, RawHolderTable};

/// Canonical view of one source's holder table: at most one record per
/// category, each carrying the maximum percentage that source reported.
#[derive(Debug, Clone)]
pub struct NormalizedSource {
    pub source: String,
    pub records: Vec<HolderRecord>,
    /// Rows whose figures could not be parsed and were treated as zero.
    pub defaulted_rows: usize,
}

impl NormalizedSource {
    pub fn empty(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            records: Vec::new(),
            defaulted_rows: 0,
        }
    }

    pub fn record_for(&self, category: HolderCategory) -> Option<&HolderRecord> {
        self.records.iter().find(|r| r.category == category)
    }

    pub fn percent_for(&self, category: HolderCategory) -> f64 {
        self.record_for(category).map_or(0.0, |r| r.percent_of_shares)
    }
}

/// Leniently parse a numeric figure: accepts plain numbers, thousands
/// separators, and a trailing percent sign. Returns `None` for anything
/// that still fails to parse.
pub fn parse_numeric(figure: &RawFigure) -> Option<f64> {
    match figure {
        RawFigure::Number(n) if n.is_finite() => Some(*n),
        RawFigure::Number(_) => None,
        RawFigure::Text(text) => {
            let cleaned = text.trim().trim_end_matches('%').replace(',', "");
            cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
        }
    }
}

/// Parse a provider date in ISO or US order; anything else is dropped.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%m/%d/%Y"))
        .ok()
}

/// Normalize one raw holder table into canonical records.
///
/// When a category appears in multiple rows (multiple filings), the maximum
/// reported percentage wins and its filing date rides along. A zero,
/// missing, or unparseable shares-outstanding total yields zero percentages
/// for share-count rows rather than an error.
pub fn normalize_table(table: &RawHolderTable) -> NormalizedSource {
    let total_shares = table
        .total_shares_outstanding
        .as_ref()
        .and_then(parse_numeric)
        .filter(|t| *t > 0.0);

    let mut best: BTreeMap<HolderCategory, HolderRecord> = BTreeMap::new();
    let mut defaulted_rows = 0usize;

    for row in &table.rows {
        let category = HolderCategory::classify(&row.holder_name);

        let (percent, parsed) = row_percent(row, total_shares);
        if !parsed {
            defaulted_rows += 1;
            debug!(
                source = %table.source,
                holder = %row.holder_name,
                "unparseable holder figure treated as zero"
            );
        }

        let as_of_date = row.as_of_date.as_deref().and_then(parse_date);

        match best.get(&category) {
            Some(existing) if existing.percent_of_shares >= percent => {}
            _ => {
                best.insert(
                    category,
                    HolderRecord {
                        category,
                        percent_of_shares: percent,
                        as_of_date,
                        source: table.source.clone(),
                    },
                );
            }
        }
    }

    NormalizedSource {
        source: table.source.clone(),
        records: best.into_values().collect(),
        defaulted_rows,
    }
}

/// Resolve a row's ownership percentage. An explicit percent figure wins;
/// otherwise share counts are converted against the table's total. The
/// second element is false when the figure had to be defaulted to zero.
fn row_percent(row: &crate::models::RawHolderRow, total_shares: Option<f64>) -> (f64, bool) {
    if let Some(figure) = &row.percent_held {
        return match parse_numeric(figure) {
            Some(pct) => (pct, true),
            None => (0.0, false),
        };
    }

    if let Some(figure) = &row.shares_held {
        return match (parse_numeric(figure), total_shares) {
            (Some(shares), Some(total)) => (100.0 * shares / total, true),
            // A share count without a usable total is a zero figure, not an
            // error: the row still classifies and stays in the table.
            (Some(_), None) => (0.0, true),
            (None, _) => (0.0, false),
        };
    }

    (0.0, false)
}
