use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{self, Result};

/// Outcome of a settled bet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetResult {
    Win,
    Loss,
}

impl BetResult {
    pub fn is_win(self) -> bool {
        self == BetResult::Win
    }

    /// Label used in tables and exports
    pub fn label(self) -> &'static str {
        match self {
            BetResult::Win => "Won",
            BetResult::Loss => "Lost",
        }
    }
}

impl std::str::FromStr for BetResult {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "win" | "won" | "w" => Ok(BetResult::Win),
            "loss" | "lost" | "l" => Ok(BetResult::Loss),
            other => Err(format!("unknown result '{}', expected win or loss", other)),
        }
    }
}

/// One logged wager
///
/// Stored in `bets.json` with the field names the dashboard has always used
/// (`type` for the category, stake and odds as plain JSON numbers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub category: String,
    /// Stake
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Decimal odds (2.0 doubles the stake on a win)
    #[serde(with = "rust_decimal::serde::float")]
    pub odds: Decimal,
    pub result: BetResult,
}

impl Bet {
    /// Net profit of this bet: `amount * odds - amount` on a win, `-amount` on a loss
    pub fn profit(&self) -> Decimal {
        match self.result {
            BetResult::Win => self.amount * self.odds - self.amount,
            BetResult::Loss => -self.amount,
        }
    }

    /// Gross return paid out (stake included), zero for a loss
    pub fn payout(&self) -> Decimal {
        match self.result {
            BetResult::Win => self.amount * self.odds,
            BetResult::Loss => Decimal::ZERO,
        }
    }

    /// Checks a stored record the same way new input is checked
    pub fn validate(&self) -> Result<()> {
        error::validate_category(&self.category)?;
        error::validate_amount(self.amount)?;
        error::validate_odds(self.odds)?;
        Ok(())
    }

    /// Merge a partial update into this bet. The id never changes.
    pub fn apply(&mut self, patch: &BetPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(category) = &patch.category {
            self.category = category.trim().to_string();
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(odds) = patch.odds {
            self.odds = odds;
        }
        if let Some(result) = patch.result {
            self.result = result;
        }
    }
}

/// Input for a bet that has not been stored yet
#[derive(Debug, Clone)]
pub struct NewBet {
    pub date: NaiveDate,
    pub category: String,
    pub amount: Decimal,
    pub odds: Decimal,
    pub result: BetResult,
}

impl NewBet {
    /// Presence checks only: category set, stake and odds positive
    pub fn validate(&self) -> Result<()> {
        error::validate_category(&self.category)?;
        error::validate_amount(self.amount)?;
        error::validate_odds(self.odds)?;
        Ok(())
    }

    /// Assign a fresh id
    pub fn into_bet(self) -> Bet {
        Bet {
            id: uuid::Uuid::new_v4().to_string(),
            date: self.date,
            category: self.category.trim().to_string(),
            amount: self.amount,
            odds: self.odds,
            result: self.result,
        }
    }
}

/// Partial update for an existing bet
#[derive(Debug, Clone, Default)]
pub struct BetPatch {
    pub date: Option<NaiveDate>,
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub odds: Option<Decimal>,
    pub result: Option<BetResult>,
}

impl BetPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.category.is_none()
            && self.amount.is_none()
            && self.odds.is_none()
            && self.result.is_none()
    }

    /// Same presence checks as `NewBet::validate`, applied to the fields present
    pub fn validate(&self) -> Result<()> {
        if let Some(category) = &self.category {
            error::validate_category(category)?;
        }
        if let Some(amount) = self.amount {
            error::validate_amount(amount)?;
        }
        if let Some(odds) = self.odds {
            error::validate_odds(odds)?;
        }
        Ok(())
    }
}

/// Categories offered by the entry form. Any other non-empty label is accepted too.
pub const KNOWN_CATEGORIES: [&str; 5] = ["escanteios", "cartoes", "gols", "resultado", "outros"];

/// Confidence level for a win-rate estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    /// n < 10
    Unreliable,
    /// 10 <= n < 30
    Weak,
    /// 30 <= n < 100
    Moderate,
    /// n >= 100
    Strong,
}

impl ConfidenceLevel {
    pub fn from_sample_count(n: u32) -> Self {
        if n < 10 {
            ConfidenceLevel::Unreliable
        } else if n < 30 {
            ConfidenceLevel::Weak
        } else if n < 100 {
            ConfidenceLevel::Moderate
        } else {
            ConfidenceLevel::Strong
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Records written on first start so the dashboard is not empty
pub fn sample_bets() -> Vec<Bet> {
    let rows: [(&str, (i32, u32, u32), &str, i64, i64, BetResult); 8] = [
        ("1", (2023, 6, 1), "escanteios", 100, 185, BetResult::Win),
        ("2", (2023, 6, 2), "cartoes", 50, 210, BetResult::Loss),
        ("3", (2023, 6, 3), "gols", 75, 195, BetResult::Win),
        ("4", (2023, 6, 4), "resultado", 120, 250, BetResult::Loss),
        ("5", (2023, 6, 5), "escanteios", 80, 175, BetResult::Win),
        ("6", (2023, 6, 6), "cartoes", 60, 220, BetResult::Win),
        ("7", (2023, 6, 7), "gols", 90, 190, BetResult::Loss),
        ("8", (2023, 6, 8), "resultado", 150, 300, BetResult::Win),
    ];

    rows.iter()
        .filter_map(|(id, (y, m, d), category, amount, odds_cents, result)| {
            Some(Bet {
                id: id.to_string(),
                date: NaiveDate::from_ymd_opt(*y, *m, *d)?,
                category: category.to_string(),
                amount: Decimal::from(*amount),
                odds: Decimal::new(*odds_cents, 2),
                result: *result,
            })
        })
        .collect()
}

/// Per-user preferences, stored in `userSettings.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub name: String,
    pub email: String,
    /// Profit target for a calendar month
    #[serde(with = "rust_decimal::serde::str")]
    pub monthly_goal: Decimal,
    pub dark_mode: bool,
    pub notifications: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            name: "Usuário".to_string(),
            email: "usuario@exemplo.com".to_string(),
            monthly_goal: Decimal::from(1000),
            dark_mode: true,
            notifications: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub monthly_goal: Option<Decimal>,
    pub dark_mode: Option<bool>,
    pub notifications: Option<bool>,
}

impl UserSettings {
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(goal) = patch.monthly_goal {
            self.monthly_goal = goal;
        }
        if let Some(dark_mode) = patch.dark_mode {
            self.dark_mode = dark_mode;
        }
        if let Some(notifications) = patch.notifications {
            self.notifications = notifications;
        }
    }
}

/// Two-decimal rendering of a money amount, halves rounded away from zero
pub fn fixed2(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}
