//! Tier classification and deterministic ordering.
//!
//! Tier 1: both holders at 4%+. Tier 2: one holder at 3%+ with the other
//! present. Tier 3: everything else that survived eligibility. Within
//! Tier 1 the biggest combined position sorts first, cheapest price
//! breaking ties; lower tiers sort by price alone. A final ticker
//! tie-break makes the order independent of input iteration order.

use std::cmp::Ordering;

use crate::models::{RankedSecurity, SecuritySnapshot};

const TIER1_MIN_PCT: f64 = 4.0;
const TIER2_MIN_PCT: f64 = 3.0;

// Fixed presentation thresholds: both holders at 5%+ under a dollar.
const PREMIUM_MIN_PCT: f64 = 5.0;
const PREMIUM_MAX_PRICE: f64 = 1.0;

/// Assign the priority tier. Evaluated in fixed order, first match wins.
pub fn classify_tier(snapshot: &SecuritySnapshot) -> u8 {
    let blackrock = snapshot.blackrock_pct();
    let vanguard = snapshot.vanguard_pct();

    if blackrock >= TIER1_MIN_PCT && vanguard >= TIER1_MIN_PCT {
        1
    } else if (blackrock >= TIER2_MIN_PCT && vanguard > 0.0)
        || (vanguard >= TIER2_MIN_PCT && blackrock > 0.0)
    {
        2
    } else {
        3
    }
}

fn is_premium(snapshot: &SecuritySnapshot, tier: u8) -> bool {
    tier == 1
        && snapshot.blackrock_pct() >= PREMIUM_MIN_PCT
        && snapshot.vanguard_pct() >= PREMIUM_MIN_PCT
        && snapshot.price.is_some_and(|p| p < PREMIUM_MAX_PRICE)
}

/// Tier-dependent composite sort key, ascending on every component.
/// Tier 1 negates the combined percentage so bigger positions sort first.
fn sort_key(ranked: &RankedSecurity) -> (u8, f64, f64) {
    let price = ranked.snapshot.price.unwrap_or(f64::MAX);
    match ranked.tier {
        1 => (1, -ranked.snapshot.combined_pct(), price),
        tier => (tier, price, 0.0),
    }
}

/// Classify and totally order the qualifying set.
///
/// The result is deterministic for equal inputs: tier ascending, the
/// documented within-tier keys, then ticker ascending.
pub fn rank(snapshots: Vec<SecuritySnapshot>) -> Vec<RankedSecurity> {
    let mut ranked: Vec<RankedSecurity> = snapshots
        .into_iter()
        .map(|snapshot| {
            let tier = classify_tier(&snapshot);
            let premium = is_premium(&snapshot, tier);
            RankedSecurity {
                snapshot,
                tier,
                premium,
            }
        })
        .collect();

    ranked.sort_by(compare);
    ranked
}

/// Strict comparison used by the public order; exposed for tests asserting
/// the total-order property.
pub fn compare(a: &RankedSecurity, b: &RankedSecurity) -> Ordering {
    let (a_tier, a_primary, a_secondary) = sort_key(a);
    let (b_tier, b_primary, b_secondary) = sort_key(b);
    a_tier
        .cmp(&b_tier)
        .then(a_primary.total_cmp(&b_primary))
        .then(a_secondary.total_cmp(&b_secondary))
        .then_with(|| a.snapshot.ticker.cmp(&b.snapshot.ticker))
}
