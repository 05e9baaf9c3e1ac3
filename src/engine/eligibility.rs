//! Eligibility screening.

use crate::engine::ScreenCriteria;
use crate::models::{HolderCategory, SecuritySnapshot};

/// Decide whether a reconciled security qualifies for ranking.
///
/// Price is an exclusive upper bound: an absent price or one at or above
/// the ceiling fails outright. Holdings then pass in require-all mode when
/// every tracked category meets the threshold, otherwise when at least one
/// does. All-zero holdings always fail, whatever the mode.
pub fn is_eligible(snapshot: &SecuritySnapshot, criteria: &ScreenCriteria) -> bool {
    match snapshot.price {
        Some(p) if p < criteria.price_ceiling => {}
        _ => return false,
    }

    if !snapshot.has_any_holdings() {
        return false;
    }

    let meets = |category: HolderCategory| snapshot.percent_for(category) >= criteria.min_holding_pct;

    if criteria.require_all_holders {
        HolderCategory::TRACKED.iter().all(|c| meets(*c))
    } else {
        HolderCategory::TRACKED.iter().any(|c| meets(*c))
    }
}
