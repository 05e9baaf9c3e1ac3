//! Builders for raw tables and reconciled snapshots.

use holdings_scanner::engine::normalizer::NormalizedSource;
use holdings_scanner::engine::reconciler::build_snapshot;
use holdings_scanner::models::{
    HolderCategory, HolderRecord, RawFigure, RawHolderRow, RawHolderTable, SecuritySnapshot,
};

/// A percent-style holder table the way Yahoo reports one.
pub fn yahoo_table(holders: &[(&str, f64)]) -> RawHolderTable {
    let mut table = RawHolderTable::new("yahoo");
    for (name, pct) in holders {
        table.rows.push(RawHolderRow {
            holder_name: name.to_string(),
            percent_held: Some(RawFigure::Number(*pct)),
            shares_held: None,
            as_of_date: None,
        });
    }
    table
}

/// A share-count holder table the way Nasdaq reports one.
pub fn nasdaq_table(total_shares: f64, holders: &[(&str, f64)]) -> RawHolderTable {
    let mut table = RawHolderTable::new("nasdaq");
    table.total_shares_outstanding = Some(RawFigure::Number(total_shares));
    for (name, shares) in holders {
        table.rows.push(RawHolderRow {
            holder_name: name.to_string(),
            percent_held: None,
            shares_held: Some(RawFigure::Number(*shares)),
            as_of_date: None,
        });
    }
    table
}

/// A normalized single source reporting the two tracked holders directly.
pub fn source(name: &str, blackrock: f64, vanguard: f64) -> NormalizedSource {
    let mut records = Vec::new();
    for (category, pct) in [
        (HolderCategory::Blackrock, blackrock),
        (HolderCategory::Vanguard, vanguard),
    ] {
        if pct > 0.0 {
            records.push(HolderRecord {
                category,
                percent_of_shares: pct,
                as_of_date: None,
                source: name.to_string(),
            });
        }
    }
    NormalizedSource {
        source: name.to_string(),
        records,
        defaulted_rows: 0,
    }
}

/// A reconciled snapshot from one synthetic source.
pub fn snapshot(ticker: &str, price: Option<f64>, blackrock: f64, vanguard: f64) -> SecuritySnapshot {
    build_snapshot(ticker, price, &[source("test", blackrock, vanguard)], 1.0)
}
