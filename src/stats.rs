//! Derived statistics over the bet list.
//!
//! Every view, export and chart reads its numbers from here so the profit,
//! ROI and win-rate formulas exist exactly once.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

use crate::models::{Bet, ConfidenceLevel};

/// Z-score for 95% confidence interval
const Z_95: f64 = 1.96;

/// Totals over a set of bets
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_bets: usize,
    pub wins: usize,
    pub losses: usize,
    pub total_wagered: Decimal,
    /// Sum of payouts of winning bets, stakes included
    pub total_winnings: Decimal,
    pub net_profit: Decimal,
    /// Percentage of bets won
    pub win_rate: f64,
    /// Net profit over total stake, in percent
    pub roi: f64,
}

/// Ratio of two decimals in percent, zero when the denominator is zero.
/// Ratios too large for `Decimal` are computed in `f64`.
pub fn percent(numerator: Decimal, denominator: Decimal) -> f64 {
    if denominator.is_zero() {
        return 0.0;
    }
    numerator
        .checked_div(denominator)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|value| value.to_f64())
        .unwrap_or_else(|| {
            let num = numerator.to_f64().unwrap_or(0.0);
            let den = denominator.to_f64().unwrap_or(1.0);
            num / den * 100.0
        })
}

fn win_rate(wins: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64 * 100.0
    }
}

pub fn summarize(bets: &[Bet]) -> Summary {
    let wins = bets.iter().filter(|b| b.result.is_win()).count();
    let total_wagered: Decimal = bets.iter().map(|b| b.amount).sum();
    let total_winnings: Decimal = bets.iter().map(Bet::payout).sum();
    let net_profit: Decimal = bets.iter().map(Bet::profit).sum();

    Summary {
        total_bets: bets.len(),
        wins,
        losses: bets.len() - wins,
        total_wagered,
        total_winnings,
        net_profit,
        win_rate: win_rate(wins, bets.len()),
        roi: percent(net_profit, total_wagered),
    }
}

/// Group bets by category, keeping the order in which categories first appear
pub fn group_by_category(bets: &[Bet]) -> Vec<(String, Vec<&Bet>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Bet>)> = Vec::new();

    for bet in bets {
        match index.get(bet.category.as_str()) {
            Some(&i) => groups[i].1.push(bet),
            None => {
                index.insert(bet.category.as_str(), groups.len());
                groups.push((bet.category.clone(), vec![bet]));
            }
        }
    }

    groups
}

/// Performance of one category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPerformance {
    pub category: String,
    pub count: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub wagered: Decimal,
    pub profit: Decimal,
    pub roi: f64,
    /// Wilson score interval for the win rate, as fractions
    pub win_rate_lower: f64,
    pub win_rate_upper: f64,
    pub confidence_level: ConfidenceLevel,
}

/// Per-category performance, most profitable first
pub fn category_performance(bets: &[Bet]) -> Vec<CategoryPerformance> {
    let mut rows: Vec<CategoryPerformance> = group_by_category(bets)
        .into_iter()
        .map(|(category, group)| {
            let count = group.len();
            let wins = group.iter().filter(|b| b.result.is_win()).count();
            let wagered: Decimal = group.iter().map(|b| b.amount).sum();
            let profit: Decimal = group.iter().map(|b| b.profit()).sum();
            let (lower, upper) = wilson_score_interval(wins as u32, count as u32);

            CategoryPerformance {
                category,
                count,
                wins,
                win_rate: win_rate(wins, count),
                wagered,
                profit,
                roi: percent(profit, wagered),
                win_rate_lower: lower,
                win_rate_upper: upper,
                confidence_level: ConfidenceLevel::from_sample_count(count as u32),
            }
        })
        .collect();

    // sort_by is stable, ties keep first-seen order
    rows.sort_by(|a, b| b.profit.cmp(&a.profit));
    rows
}

/// Share of bets placed in one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub count: usize,
    /// Whole-number percentage of all bets
    pub percent: u32,
}

/// Bet counts per category in first-seen order
pub fn category_distribution(bets: &[Bet]) -> Vec<CategoryShare> {
    let total = bets.len();
    group_by_category(bets)
        .into_iter()
        .map(|(name, group)| CategoryShare {
            percent: (group.len() as f64 / total as f64 * 100.0).round() as u32,
            count: group.len(),
            name,
        })
        .collect()
}

/// Winning bet with the highest odds; the earliest one wins ties
pub fn best_winning_odds(bets: &[Bet]) -> Option<&Bet> {
    bets.iter()
        .filter(|b| b.result.is_win())
        .fold(None, |best: Option<&Bet>, bet| match best {
            Some(current) if bet.odds <= current.odds => Some(current),
            _ => Some(bet),
        })
}

/// Losing bet with the lowest odds; the earliest one wins ties
pub fn worst_losing_odds(bets: &[Bet]) -> Option<&Bet> {
    bets.iter()
        .filter(|b| !b.result.is_win())
        .fold(None, |worst: Option<&Bet>, bet| match worst {
            Some(current) if bet.odds >= current.odds => Some(current),
            _ => Some(bet),
        })
}

/// Cumulative ROI at the end of one betting day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiPoint {
    pub date: NaiveDate,
    pub wagered: Decimal,
    pub profit: Decimal,
    /// Cumulative ROI in percent, rounded to 2 decimals
    pub roi: f64,
}

/// Cumulative ROI after each distinct date, oldest first
pub fn roi_series(bets: &[Bet]) -> Vec<RoiPoint> {
    let mut sorted: Vec<&Bet> = bets.iter().collect();
    sorted.sort_by_key(|b| b.date);

    let mut points: Vec<RoiPoint> = Vec::new();
    let mut cumulative_wagered = Decimal::ZERO;
    let mut cumulative_profit = Decimal::ZERO;

    for bet in sorted {
        cumulative_wagered += bet.amount;
        cumulative_profit += bet.profit();

        let roi = round2(percent(cumulative_profit, cumulative_wagered));
        match points.last_mut() {
            Some(last) if last.date == bet.date => {
                last.wagered = cumulative_wagered;
                last.profit = cumulative_profit;
                last.roi = roi;
            }
            _ => points.push(RoiPoint {
                date: bet.date,
                wagered: cumulative_wagered,
                profit: cumulative_profit,
                roi,
            }),
        }
    }

    points
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Progress toward the monthly profit goal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub year: i32,
    pub month: u32,
    pub bets: usize,
    pub profit: Decimal,
    pub goal: Decimal,
    /// Share of the goal reached, in percent (negative when losing)
    pub percent: f64,
}

/// Profit of the bets dated in the month of `day`, against `goal`
pub fn monthly_goal_progress(bets: &[Bet], goal: Decimal, day: NaiveDate) -> GoalProgress {
    let in_month: Vec<&Bet> = bets
        .iter()
        .filter(|b| b.date.year() == day.year() && b.date.month() == day.month())
        .collect();
    let profit: Decimal = in_month.iter().map(|b| b.profit()).sum();

    GoalProgress {
        year: day.year(),
        month: day.month(),
        bets: in_month.len(),
        profit,
        goal,
        percent: percent(profit, goal),
    }
}

/// Calculate Wilson Score Confidence Interval for a binomial proportion
///
/// Returns (lower_bound, upper_bound) for P(success) at 95% confidence
pub fn wilson_score_interval(successes: u32, total: u32) -> (f64, f64) {
    if total == 0 {
        return (0.0, 1.0);
    }

    let n = total as f64;
    let p_hat = successes as f64 / n;
    let z = Z_95;
    let z_squared = z * z;

    let denominator = 1.0 + z_squared / n;

    let center = (p_hat + z_squared / (2.0 * n)) / denominator;

    let margin = z * ((p_hat * (1.0 - p_hat) + z_squared / (4.0 * n)) / n).sqrt() / denominator;

    let lower = (center - margin).max(0.0);
    let upper = (center + margin).min(1.0);

    (lower, upper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_bets, BetResult};
    use rust_decimal_macros::dec;

    fn bet(id: &str, date: (i32, u32, u32), category: &str, amount: Decimal, odds: Decimal, result: BetResult) -> Bet {
        Bet {
            id: id.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            category: category.to_string(),
            amount,
            odds,
            result,
        }
    }

    #[test]
    fn test_summarize_sample() {
        let summary = summarize(&sample_bets());

        assert_eq!(summary.total_bets, 8);
        assert_eq!(summary.wins, 5);
        assert_eq!(summary.losses, 3);
        assert_eq!(summary.total_wagered, dec!(725));
        // 85 - 50 + 71.25 - 120 + 60 + 72 - 90 + 300
        assert_eq!(summary.net_profit, dec!(328.25));
        assert_eq!(summary.total_winnings - summary.total_wagered, summary.net_profit);
        assert!((summary.win_rate - 62.5).abs() < 1e-9);
        assert!((summary.roi - 45.275862).abs() < 1e-4);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_bets, 0);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.roi, 0.0);
        assert_eq!(summary.net_profit, Decimal::ZERO);
    }

    #[test]
    fn test_category_performance_sorted_by_profit() {
        let rows = category_performance(&sample_bets());
        let names: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
        // resultado 180, escanteios 145, cartoes 22, gols -18.75
        assert_eq!(names, vec!["resultado", "escanteios", "cartoes", "gols"]);

        let gols = &rows[3];
        assert_eq!(gols.count, 2);
        assert_eq!(gols.wins, 1);
        assert_eq!(gols.profit, dec!(-18.75));
        assert!((gols.win_rate - 50.0).abs() < 1e-9);
        assert_eq!(gols.confidence_level, ConfidenceLevel::Unreliable);
        assert!(gols.win_rate_lower < 0.5 && gols.win_rate_upper > 0.5);
    }

    #[test]
    fn test_category_distribution_first_seen_order() {
        let bets = vec![
            bet("1", (2024, 1, 1), "gols", dec!(10), dec!(2), BetResult::Win),
            bet("2", (2024, 1, 2), "cartoes", dec!(10), dec!(2), BetResult::Win),
            bet("3", (2024, 1, 3), "gols", dec!(10), dec!(2), BetResult::Loss),
        ];
        let shares = category_distribution(&bets);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0], CategoryShare { name: "gols".to_string(), count: 2, percent: 67 });
        assert_eq!(shares[1], CategoryShare { name: "cartoes".to_string(), count: 1, percent: 33 });
        assert!(category_distribution(&[]).is_empty());
    }

    #[test]
    fn test_best_and_worst_odds() {
        let bets = sample_bets();
        assert_eq!(best_winning_odds(&bets).map(|b| b.id.as_str()), Some("8"));
        assert_eq!(worst_losing_odds(&bets).map(|b| b.id.as_str()), Some("7"));

        let ties = vec![
            bet("a", (2024, 1, 1), "gols", dec!(10), dec!(2), BetResult::Win),
            bet("b", (2024, 1, 2), "gols", dec!(10), dec!(2), BetResult::Win),
        ];
        assert_eq!(best_winning_odds(&ties).map(|b| b.id.as_str()), Some("a"));
        assert!(worst_losing_odds(&ties).is_none());
        assert!(best_winning_odds(&[]).is_none());
    }

    #[test]
    fn test_roi_series_groups_by_date() {
        let bets = vec![
            bet("1", (2024, 1, 2), "gols", dec!(100), dec!(2), BetResult::Loss),
            bet("2", (2024, 1, 1), "gols", dec!(100), dec!(2), BetResult::Win),
            bet("3", (2024, 1, 2), "gols", dec!(100), dec!(1.5), BetResult::Win),
        ];
        let series = roi_series(&bets);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(series[0].roi, 100.0);
        // cumulative: wagered 300, profit 100 - 100 + 50 = 50
        assert_eq!(series[1].wagered, dec!(300));
        assert_eq!(series[1].profit, dec!(50));
        assert_eq!(series[1].roi, 16.67);
    }

    #[test]
    fn test_roi_series_empty() {
        assert!(roi_series(&[]).is_empty());
    }

    #[test]
    fn test_monthly_goal_progress() {
        let bets = vec![
            bet("1", (2024, 3, 1), "gols", dec!(100), dec!(3), BetResult::Win),
            bet("2", (2024, 3, 20), "gols", dec!(50), dec!(2), BetResult::Loss),
            bet("3", (2024, 2, 28), "gols", dec!(500), dec!(2), BetResult::Win),
        ];
        let progress = monthly_goal_progress(&bets, dec!(1000), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(progress.bets, 2);
        assert_eq!(progress.profit, dec!(150));
        assert!((progress.percent - 15.0).abs() < 1e-9);

        let zero_goal = monthly_goal_progress(&bets, Decimal::ZERO, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(zero_goal.percent, 0.0);

        // 150 / 1e-28 does not fit in a Decimal
        let tiny_goal = monthly_goal_progress(
            &bets,
            dec!(0.0000000000000000000000000001),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        );
        assert!(tiny_goal.percent.is_finite());
        assert!(tiny_goal.percent > 1e30);
    }

    #[test]
    fn test_wilson_score_interval() {
        // 50 out of 100 successes
        let (lower, upper) = wilson_score_interval(50, 100);
        assert!(lower > 0.39 && lower < 0.41);
        assert!(upper > 0.59 && upper < 0.61);

        // Edge case: no data
        assert_eq!(wilson_score_interval(0, 0), (0.0, 1.0));

        // Edge case: all successes
        let (lower, upper) = wilson_score_interval(10, 10);
        assert!(lower > 0.6);
        assert!(upper <= 1.0);
    }
}
