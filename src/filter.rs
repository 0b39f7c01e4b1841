use chrono::{Duration, NaiveDate};
use std::collections::HashSet;

use crate::models::Bet;

/// Date window for the bet list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    /// Bets dated on or after `today - n days`
    LastDays(u32),
    /// Inclusive range; either end may be open
    Custom {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl Period {
    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match *self {
            Period::All => true,
            // a window reaching past the earliest representable date has no lower bound
            Period::LastDays(days) => today
                .checked_sub_signed(Duration::days(days as i64))
                .map_or(true, |start| date >= start),
            Period::Custom { from, to } => {
                from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
            }
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    /// Accepts `all`, `7days`, `30days`, or any `<n>days`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        if s == "all" {
            return Ok(Period::All);
        }
        s.strip_suffix("days")
            .and_then(|n| n.parse::<u32>().ok())
            .map(Period::LastDays)
            .ok_or_else(|| format!("unknown period '{}', expected all, 7days or 30days", s))
    }
}

/// Filters applied to the bet list
#[derive(Debug, Clone)]
pub struct BetFilter {
    pub period: Period,
    /// `None` keeps every category
    pub category: Option<String>,
}

impl Default for BetFilter {
    fn default() -> Self {
        Self {
            period: Period::All,
            category: None,
        }
    }
}

impl BetFilter {
    /// Matching bets, newest first
    pub fn apply<'a>(&self, bets: &'a [Bet], today: NaiveDate) -> Vec<&'a Bet> {
        let mut matching: Vec<&Bet> = bets
            .iter()
            .filter(|b| self.period.contains(b.date, today))
            .filter(|b| self.category.as_deref().map_or(true, |c| b.category == c))
            .collect();
        sort_newest_first(&mut matching);
        matching
    }
}

fn sort_newest_first(bets: &mut [&Bet]) {
    bets.sort_by(|a, b| b.date.cmp(&a.date));
}

/// The `limit` most recent bets
pub fn recent(bets: &[Bet], limit: usize) -> Vec<&Bet> {
    let mut sorted: Vec<&Bet> = bets.iter().collect();
    sort_newest_first(&mut sorted);
    sorted.truncate(limit);
    sorted
}

/// Distinct categories in first-seen order
pub fn categories(bets: &[Bet]) -> Vec<String> {
    let mut seen = HashSet::new();
    bets.iter()
        .filter(|b| seen.insert(b.category.as_str()))
        .map(|b| b.category.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{sample_bets, BetResult};
    use rust_decimal_macros::dec;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bet(id: &str, date: NaiveDate, category: &str) -> Bet {
        Bet {
            id: id.to_string(),
            date,
            category: category.to_string(),
            amount: dec!(10),
            odds: dec!(2),
            result: BetResult::Win,
        }
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("all".parse::<Period>().unwrap(), Period::All);
        assert_eq!("7days".parse::<Period>().unwrap(), Period::LastDays(7));
        assert_eq!("30DAYS".parse::<Period>().unwrap(), Period::LastDays(30));
        assert!("week".parse::<Period>().is_err());
    }

    #[test]
    fn test_last_days_boundary() {
        let today = day(2024, 5, 10);
        let period = Period::LastDays(7);
        assert!(period.contains(day(2024, 5, 3), today));
        assert!(!period.contains(day(2024, 5, 2), today));
        assert!(period.contains(day(2024, 5, 10), today));
    }

    #[test]
    fn test_huge_window_keeps_everything() {
        let period: Period = "100000000days".parse().unwrap();
        let bets = sample_bets();
        let filter = BetFilter { period, category: None };
        assert_eq!(filter.apply(&bets, day(2024, 5, 10)).len(), 8);
        assert!(period.contains(day(1, 1, 1), day(2024, 5, 10)));
    }

    #[test]
    fn test_custom_range() {
        let today = day(2024, 5, 10);
        let period = Period::Custom { from: Some(day(2024, 1, 1)), to: Some(day(2024, 1, 31)) };
        assert!(period.contains(day(2024, 1, 31), today));
        assert!(!period.contains(day(2024, 2, 1), today));

        let open = Period::Custom { from: None, to: Some(day(2024, 1, 31)) };
        assert!(open.contains(day(1999, 1, 1), today));
    }

    #[test]
    fn test_filter_by_category_sorted_newest_first() {
        let bets = vec![
            bet("1", day(2024, 1, 1), "gols"),
            bet("2", day(2024, 1, 5), "cartoes"),
            bet("3", day(2024, 1, 3), "gols"),
        ];
        let filter = BetFilter { period: Period::All, category: Some("gols".to_string()) };
        let ids: Vec<&str> = filter.apply(&bets, day(2024, 1, 10)).iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    #[test]
    fn test_recent() {
        let bets = sample_bets();
        let recent = recent(&bets, 5);
        let ids: Vec<&str> = recent.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["8", "7", "6", "5", "4"]);
        assert!(super::recent(&[], 5).is_empty());
    }

    #[test]
    fn test_categories() {
        assert_eq!(categories(&sample_bets()), vec!["escanteios", "cartoes", "gols", "resultado"]);
    }
}
