//! Critical Path Tests for the bet tracker
//!
//! These tests verify the formulas every view depends on:
//! 1. Profit per bet: win = stake × (odds − 1), loss = −stake
//! 2. ROI: cumulative net profit / cumulative stake × 100
//! 3. Win rate: wins / total × 100
//! 4. Persistence: every mutation is visible to the next load
//!
//! Run with: cargo test --test critical_path_tests

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::f64::consts::PI;

use bettrack::chart::{PieLayout, RoiLayout};
use bettrack::filter::{BetFilter, Period};
use bettrack::models::{sample_bets, Bet, BetPatch, BetResult, NewBet};
use bettrack::output::{self, ExportOptions};
use bettrack::stats;
use bettrack::store::BetStore;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bet(id: &str, day: u32, category: &str, amount: rust_decimal::Decimal, odds: rust_decimal::Decimal, result: BetResult) -> Bet {
    Bet {
        id: id.to_string(),
        date: date(2024, 1, day),
        category: category.to_string(),
        amount,
        odds,
        result,
    }
}

// ============================================================================
// PROFIT FORMULA TESTS
// ============================================================================

#[test]
fn test_profit_of_winning_bet() {
    // 100 at 1.85 wins 100 × 0.85 = 85
    let b = bet("a", 1, "escanteios", dec!(100), dec!(1.85), BetResult::Win);
    assert_eq!(b.profit(), dec!(85));
    assert_eq!(b.payout(), dec!(185));
}

#[test]
fn test_profit_of_losing_bet_is_minus_stake() {
    // Odds do not matter for a loss
    let b = bet("a", 1, "cartoes", dec!(50), dec!(2.10), BetResult::Loss);
    assert_eq!(b.profit(), dec!(-50));
    assert_eq!(b.payout(), dec!(0));
}

#[test]
fn test_decimal_money_has_no_float_drift() {
    // 0.1 + 0.2 style errors would show up here with binary floats
    let bets = vec![
        bet("a", 1, "gols", dec!(0.1), dec!(2), BetResult::Win),
        bet("b", 1, "gols", dec!(0.2), dec!(2), BetResult::Win),
    ];
    assert_eq!(stats::summarize(&bets).net_profit, dec!(0.3));
}

// ============================================================================
// SUMMARY TESTS
// ============================================================================

#[test]
fn test_summary_of_sample_bets() {
    let summary = stats::summarize(&sample_bets());

    assert_eq!(summary.total_bets, 8);
    assert_eq!(summary.wins, 5);
    assert_eq!(summary.losses, 3);
    assert_eq!(summary.total_wagered, dec!(725));
    assert_eq!(summary.net_profit, dec!(328.25));
    assert!((summary.win_rate - 62.5).abs() < 1e-9);
    // 328.25 / 725 = 45.2759%
    assert!((summary.roi - 45.2759).abs() < 0.001, "ROI should be ~45.28%, got {:.4}", summary.roi);
}

#[test]
fn test_summary_of_nothing_is_all_zero() {
    let summary = stats::summarize(&[]);

    assert_eq!(summary.total_bets, 0);
    assert_eq!(summary.net_profit, dec!(0));
    assert_eq!(summary.win_rate, 0.0);
    assert_eq!(summary.roi, 0.0);
}

// ============================================================================
// ROI SERIES TESTS
// ============================================================================

#[test]
fn test_roi_series_is_cumulative() {
    let series = stats::roi_series(&sample_bets());
    let rois: Vec<f64> = series.iter().map(|p| p.roi).collect();

    assert_eq!(rois, vec![85.0, 23.33, 47.22, -3.99, 10.88, 24.38, 4.91, 45.28]);
    assert_eq!(series.last().unwrap().wagered, dec!(725));
}

#[test]
fn test_roi_series_merges_same_day_and_sorts() {
    let bets = vec![
        bet("late", 3, "gols", dec!(100), dec!(2), BetResult::Loss),
        bet("a", 1, "gols", dec!(100), dec!(2), BetResult::Win),
        bet("b", 1, "gols", dec!(100), dec!(2), BetResult::Loss),
    ];
    let series = stats::roi_series(&bets);

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].date, date(2024, 1, 1));
    assert_eq!(series[0].roi, 0.0);
    // (100 - 100 - 100) / 300
    assert_eq!(series[1].roi, -33.33);
}

// ============================================================================
// CATEGORY TESTS
// ============================================================================

#[test]
fn test_category_ranking_by_profit() {
    let perf = stats::category_performance(&sample_bets());
    let order: Vec<&str> = perf.iter().map(|p| p.category.as_str()).collect();

    assert_eq!(order, vec!["resultado", "escanteios", "cartoes", "gols"]);
    assert_eq!(perf[0].profit, dec!(180));
    assert_eq!(perf[3].profit, dec!(-18.75));
    assert!((perf[1].win_rate - 100.0).abs() < 1e-9);
}

#[test]
fn test_distribution_shares() {
    let shares = stats::category_distribution(&sample_bets());
    assert_eq!(shares.len(), 4);
    assert!(shares.iter().all(|s| s.count == 2 && s.percent == 25));
}

#[test]
fn test_odds_extremes() {
    let bets = sample_bets();
    assert_eq!(stats::best_winning_odds(&bets).unwrap().id, "8");
    assert_eq!(stats::worst_losing_odds(&bets).unwrap().id, "7");
    assert!(stats::best_winning_odds(&[]).is_none());
}

#[test]
fn test_monthly_goal_progress() {
    let goal = stats::monthly_goal_progress(&sample_bets(), dec!(1000), date(2023, 6, 20));
    assert_eq!(goal.bets, 8);
    assert_eq!(goal.profit, dec!(328.25));
    assert!((goal.percent - 32.825).abs() < 1e-9);

    let other_month = stats::monthly_goal_progress(&sample_bets(), dec!(1000), date(2023, 7, 1));
    assert_eq!(other_month.bets, 0);
    assert_eq!(other_month.percent, 0.0);
}

// ============================================================================
// FILTER TESTS
// ============================================================================

#[test]
fn test_last_seven_days_filter() {
    let bets = sample_bets();
    let filter = BetFilter { period: Period::LastDays(7), category: None };
    let matching = filter.apply(&bets, date(2023, 6, 10));

    // 2023-06-03 onwards, newest first
    assert_eq!(matching.len(), 6);
    assert_eq!(matching[0].id, "8");
    assert_eq!(matching[5].id, "3");
}

#[test]
fn test_category_and_custom_range_filter() {
    let bets = sample_bets();
    let filter = BetFilter {
        period: Period::Custom { from: Some(date(2023, 6, 1)), to: Some(date(2023, 6, 5)) },
        category: Some("escanteios".to_string()),
    };
    let ids: Vec<&str> = filter.apply(&bets, date(2023, 6, 30)).iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["5", "1"]);
}

// ============================================================================
// STORE FLOW TESTS
// ============================================================================

#[test]
fn test_add_then_statistics_see_the_new_bet() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = BetStore::open(dir.path(), true).unwrap();

    store
        .add(NewBet {
            date: date(2023, 6, 9),
            category: "gols".to_string(),
            amount: dec!(75),
            odds: dec!(2),
            result: BetResult::Loss,
        })
        .unwrap();

    let reloaded = BetStore::open(dir.path(), true).unwrap();
    let summary = stats::summarize(reloaded.bets());
    assert_eq!(summary.total_bets, 9);
    assert_eq!(summary.net_profit, dec!(253.25));
    assert_eq!(summary.total_wagered, dec!(800));
}

#[test]
fn test_update_changes_profit_and_delete_removes() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = BetStore::open(dir.path(), true).unwrap();

    // bet 7 (90 at 1.90) flips from a loss to a win: -90 becomes +81
    let patch = BetPatch { result: Some(BetResult::Win), ..Default::default() };
    store.update("7", &patch).unwrap();
    assert_eq!(stats::summarize(store.bets()).net_profit, dec!(499.25));

    store.delete("8").unwrap();
    let reloaded = BetStore::open(dir.path(), true).unwrap();
    assert_eq!(reloaded.bets().len(), 7);
    assert!(reloaded.get("8").is_none());
}

#[test]
fn test_export_csv_from_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = BetStore::open(dir.path(), true).unwrap();
    let path = dir.path().join("export.csv");

    output::export_csv(store.bets(), &ExportOptions::default(), &path).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("Date,Category,"));
    assert!(contents.contains("STATISTICS"));
    assert!(contents.contains("PERFORMANCE BY CATEGORY"));
    assert!(contents.contains("328.25"));
}

// ============================================================================
// CHART TESTS
// ============================================================================

#[test]
fn test_pie_covers_full_circle_when_complete() {
    let shares = stats::category_distribution(&sample_bets());
    let layout = PieLayout::compute(&shares, 600.0, 400.0, 60.0, 1.0);

    let first = layout.slices.first().unwrap();
    let last = layout.slices.last().unwrap();
    assert!((first.start_angle + PI / 2.0).abs() < 1e-9);
    assert!((last.end_angle - first.start_angle - 2.0 * PI).abs() < 1e-9);
}

#[test]
fn test_roi_chart_ends_at_latest_value() {
    let series = stats::roi_series(&sample_bets());
    let layout = RoiLayout::compute(&series, 600.0, 400.0, 40.0, 5, 6, 1.0);

    assert_eq!(layout.points.len(), 8);
    assert_eq!(layout.points.last().unwrap().roi, 45.28);
    assert!((layout.points.last().unwrap().x - 560.0).abs() < 1e-9);
}
