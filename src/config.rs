use anyhow::{bail, Context, Result};
use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::fixed2;

/// Tracker configuration loaded from YAML file
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub charts: ChartConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding bets.json and userSettings.json
    pub data_dir: PathBuf,
    /// Write the sample bets when no bets.json exists yet
    pub seed_sample_data: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency_symbol: String,
    /// chrono format string for dates in tables and exports
    pub date_format: String,
    /// Number of bets shown on the dashboard
    pub recent_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    /// Plot area inset for the ROI chart
    pub padding: f64,
    /// Space kept between the pie and the canvas edge
    pub pie_margin: f64,
    pub grid_lines: u32,
    /// Approximate number of date labels on the ROI chart
    pub x_labels: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub file_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            seed_sample_data: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "R$".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            recent_limit: 5,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            padding: 40.0,
            pie_margin: 60.0,
            grid_lines: 5,
            x_labels: 6,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            file_prefix: "bettrack".to_string(),
        }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            display: DisplayConfig::default(),
            charts: ChartConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: TrackerConfig = serde_yaml::from_str(&contents)
            .with_context(|| "Failed to parse YAML configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would break rendering later on
    pub fn validate(&self) -> Result<()> {
        check_date_format(&self.display.date_format)
            .with_context(|| "Invalid display.date_format")?;
        Ok(())
    }

    /// Load the file if it exists (defaults otherwise), then apply environment overrides
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            Self::default()
        };

        if let Ok(val) = std::env::var("BETTRACK_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("BETTRACK_CURRENCY") {
            config.display.currency_symbol = val;
        }
        if let Ok(val) = std::env::var("BETTRACK_RECENT_LIMIT") {
            config.display.recent_limit = val.parse().unwrap_or(config.display.recent_limit);
        }

        config.validate()?;
        Ok(config)
    }

    /// Format an amount with the configured currency symbol and 2 decimals
    pub fn money(&self, amount: rust_decimal::Decimal) -> String {
        if amount.is_sign_negative() && !amount.is_zero() {
            format!("-{} {}", self.display.currency_symbol, fixed2(amount.abs()))
        } else {
            format!("{} {}", self.display.currency_symbol, fixed2(amount))
        }
    }
}

/// A chrono format string is usable only if every specifier is known
pub fn check_date_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        bail!("unsupported date format '{}'", format);
    }
    Ok(())
}
