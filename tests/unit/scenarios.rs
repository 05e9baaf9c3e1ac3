//! End-to-end engine scenarios: raw tables in, tiers out.

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use test_log::test;

use holdings_scanner::engine::normalizer::normalize_table;
use holdings_scanner::engine::reconciler::build_snapshot;
use holdings_scanner::engine::{eligibility, ranking, ScreenCriteria};
use holdings_scanner::models::{DataQuality, HolderCategory};

use crate::common::fixtures;

#[test]
fn single_source_strong_double_holder_lands_in_tier_one() {
    let table = fixtures::yahoo_table(&[
        ("BlackRock Fund Advisors", 4.5),
        ("Vanguard Group Inc", 4.2),
        ("State Street Corp", 9.0),
    ]);
    let sources = [normalize_table(&table)];
    let snapshot = build_snapshot("AAA", Some(0.75), &sources, 1.0);

    assert_eq!(snapshot.blackrock_pct(), 4.5);
    assert_eq!(snapshot.vanguard_pct(), 4.2);
    assert_matches!(snapshot.data_quality, DataQuality::High);

    assert!(eligibility::is_eligible(&snapshot, &ScreenCriteria::default()));

    let ranked = ranking::rank(vec![snapshot]);
    assert_eq!(ranked[0].tier, 1);
    // 4.5/4.2 is solid but short of the 5/5 premium bar.
    assert!(!ranked[0].premium);
}

#[test]
fn disagreeing_sources_take_the_max_and_fall_to_tier_three() {
    // Source X reports 3.2%, source Y reports 5.1%; Vanguard absent.
    let x = fixtures::source("x", 3.2, 0.0);
    let y = fixtures::source("y", 5.1, 0.0);
    let snapshot = build_snapshot("BBB", Some(1.50), &[x, y], 1.0);

    assert_eq!(snapshot.blackrock_pct(), 5.1);
    assert_eq!(
        snapshot.figures[&HolderCategory::Blackrock].source.as_deref(),
        Some("y")
    );
    assert!((snapshot.discrepancy[&HolderCategory::Blackrock] - 1.9).abs() < 1e-9);
    assert_matches!(snapshot.data_quality, DataQuality::Medium);

    // Passes require-any screening at the 4.0 threshold...
    assert!(eligibility::is_eligible(&snapshot, &ScreenCriteria::default()));

    // ...but with Vanguard at zero it can reach neither tier 1 nor tier 2.
    let ranked = ranking::rank(vec![snapshot]);
    assert_eq!(ranked[0].tier, 3);
}

#[test]
fn agreeing_heavy_holders_under_a_dollar_are_premium() {
    let yahoo = fixtures::yahoo_table(&[
        ("BlackRock Inc.", 6.0),
        ("Vanguard Group", 6.0),
    ]);
    // Nasdaq reports the same positions as share counts.
    let nasdaq = fixtures::nasdaq_table(
        1_000_000.0,
        &[("BLACKROCK", 60_000.0), ("VANGUARD GROUP INC", 60_000.0)],
    );
    let sources = [normalize_table(&yahoo), normalize_table(&nasdaq)];
    let snapshot = build_snapshot("CCC", Some(0.40), &sources, 1.0);

    assert_eq!(snapshot.blackrock_pct(), 6.0);
    assert_eq!(snapshot.vanguard_pct(), 6.0);
    // Identical figures from both sources count as agreement.
    assert_matches!(snapshot.data_quality, DataQuality::High);

    let ranked = ranking::rank(vec![snapshot]);
    assert_eq!(ranked[0].tier, 1);
    assert!(ranked[0].premium);
}

#[test]
fn reconciled_percentages_stay_on_the_whole_number_scale() {
    let nasdaq = fixtures::nasdaq_table(2_000_000.0, &[("BlackRock Advisors", 90_000.0)]);
    let snapshot = build_snapshot("DDD", Some(1.0), &[normalize_table(&nasdaq)], 1.0);

    // 90k of 2M shares is 4.5 points, not 0.045.
    assert_eq!(snapshot.blackrock_pct(), 4.5);
    assert!(snapshot.blackrock_pct() <= 100.0);
    assert!(snapshot.blackrock_pct() >= 0.0);
}
