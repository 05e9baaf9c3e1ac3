//! Ownership reconciliation and ranking engine.
//!
//! Pure, synchronous transformations over already-fetched data: raw holder
//! tables in, an ordered, tiered list of qualifying securities out. All
//! network and file concerns live outside this module.

pub mod eligibility;
pub mod normalizer;
pub mod ranking;
pub mod reconciler;

use crate::models::Config;

/// Screening thresholds, passed explicitly into the filter and classifier
/// rather than read from ambient state.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenCriteria {
    /// Exclusive upper price bound in dollars.
    pub price_ceiling: f64,
    /// Minimum holding threshold in percentage points (0-100 scale).
    pub min_holding_pct: f64,
    /// true = every tracked holder must meet the threshold; false = any one.
    pub require_all_holders: bool,
    /// Cross-source gap beyond which data quality drops to medium.
    pub discrepancy_tolerance: f64,
}

impl Default for ScreenCriteria {
    fn default() -> Self {
        Self {
            price_ceiling: 2.0,
            min_holding_pct: 4.0,
            require_all_holders: false,
            discrepancy_tolerance: 1.0,
        }
    }
}

impl From<&Config> for ScreenCriteria {
    fn from(config: &Config) -> Self {
        Self {
            price_ceiling: config.price_ceiling,
            min_holding_pct: config.min_holding_pct,
            require_all_holders: config.require_all_holders,
            discrepancy_tolerance: config.discrepancy_tolerance,
        }
    }
}
