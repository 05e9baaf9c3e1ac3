//! Cross-source reconciliation.
//!
//! Merges normalized records from any number of sources into one
//! best-estimate figure per tracked category. Providers under-report
//! rather than over-report holdings because of filing lag, so the highest
//! figure is taken as the most complete one.

use std::collections::BTreeMap;

use crate::engine::normalizer::NormalizedSource;
use crate::models::{
    DataQuality, HolderCategory, ReconciledFigure, SecuritySnapshot,
};

/// Build the reconciled snapshot for one ticker from all of its sources.
///
/// Total reconciliation failure (no usable category data from any source)
/// still yields a snapshot: all-zero figures with Low quality, which will
/// simply fail eligibility downstream.
pub fn build_snapshot(
    ticker: &str,
    price: Option<f64>,
    sources: &[NormalizedSource],
    discrepancy_tolerance: f64,
) -> SecuritySnapshot {
    let mut figures = BTreeMap::new();
    let mut discrepancy = BTreeMap::new();

    for category in HolderCategory::TRACKED {
        figures.insert(category, reconcile_category(category, sources));
        discrepancy.insert(category, category_discrepancy(category, sources));
    }

    let data_quality = assess_quality(&figures, &discrepancy, discrepancy_tolerance);

    SecuritySnapshot {
        ticker: ticker.to_string(),
        price,
        figures,
        data_quality,
        discrepancy,
    }
}

/// Maximum non-zero figure across sources, with the winning source and its
/// filing date. Ties keep the earlier source in the caller's provider
/// order.
fn reconcile_category(
    category: HolderCategory,
    sources: &[NormalizedSource],
) -> ReconciledFigure {
    let mut best = ReconciledFigure::absent();

    for source in sources {
        if let Some(record) = source.record_for(category) {
            if record.percent_of_shares > best.percent {
                best = ReconciledFigure {
                    percent: record.percent_of_shares,
                    source: Some(source.source.clone()),
                    as_of_date: record.as_of_date,
                };
            }
        }
    }

    best
}

/// Gap between the two highest non-zero reports for a category; zero
/// unless at least two sources report a non-zero value.
fn category_discrepancy(category: HolderCategory, sources: &[NormalizedSource]) -> f64 {
    let mut reported: Vec<f64> = sources
        .iter()
        .map(|s| s.percent_for(category))
        .filter(|p| *p > 0.0)
        .collect();

    if reported.len() < 2 {
        return 0.0;
    }

    reported.sort_by(|a, b| b.total_cmp(a));
    (reported[0] - reported[1]).abs()
}

fn assess_quality(
    figures: &BTreeMap<HolderCategory, ReconciledFigure>,
    discrepancy: &BTreeMap<HolderCategory, f64>,
    tolerance: f64,
) -> DataQuality {
    let any_reported = figures.values().any(|f| f.percent > 0.0);
    if !any_reported {
        return DataQuality::Low;
    }

    let disagrees = discrepancy.values().any(|d| *d > tolerance);
    if disagrees {
        DataQuality::Medium
    } else {
        DataQuality::High
    }
}
