//! Local storage for bets and user settings.
//!
//! Each document is a pretty-printed JSON file in the data directory. Every
//! mutation rewrites the whole document; whatever the last write left on disk
//! is what the next run loads.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, TrackerError};
use crate::models::{sample_bets, Bet, BetPatch, NewBet, SettingsPatch, UserSettings};

pub const BETS_FILE: &str = "bets.json";
pub const SETTINGS_FILE: &str = "userSettings.json";

fn read_document<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    let value = serde_json::from_str(&contents)?;
    Ok(Some(value))
}

fn write_document<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

/// The bet list, mirrored to `bets.json`
#[derive(Debug)]
pub struct BetStore {
    path: PathBuf,
    bets: Vec<Bet>,
}

impl BetStore {
    /// Load `bets.json` from `dir`. When the file does not exist yet it is
    /// created, holding the sample bets if `seed` is set, an empty list otherwise.
    pub fn open(dir: &Path, seed: bool) -> Result<Self> {
        let path = dir.join(BETS_FILE);

        let store = match read_document::<Vec<Bet>>(&path)? {
            Some(bets) => {
                for bet in &bets {
                    bet.validate().map_err(|e| {
                        TrackerError::Validation(format!("{} holds an invalid bet {}: {}", path.display(), bet.id, e))
                    })?;
                }
                debug!("Loaded {} bets from {}", bets.len(), path.display());
                Self { path, bets }
            }
            None => {
                let bets = if seed { sample_bets() } else { Vec::new() };
                info!("No bet file at {}, starting with {} bets", path.display(), bets.len());
                let store = Self { path, bets };
                store.save()?;
                store
            }
        };

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }

    pub fn get(&self, id: &str) -> Option<&Bet> {
        self.bets.iter().find(|b| b.id == id)
    }

    fn save(&self) -> Result<()> {
        write_document(&self.path, &self.bets)
    }

    /// Validate and append a new bet
    pub fn add(&mut self, new_bet: NewBet) -> Result<Bet> {
        new_bet.validate()?;
        let bet = new_bet.into_bet();
        self.bets.push(bet.clone());
        self.save()?;
        info!("Added bet {} ({} @ {})", bet.id, bet.amount, bet.odds);
        Ok(bet)
    }

    /// Merge `patch` into the bet with `id`
    pub fn update(&mut self, id: &str, patch: &BetPatch) -> Result<Bet> {
        patch.validate()?;
        let bet = self
            .bets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))?;
        bet.apply(patch);
        let updated = bet.clone();
        self.save()?;
        info!("Updated bet {}", id);
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> Result<Bet> {
        let index = self
            .bets
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))?;
        let removed = self.bets.remove(index);
        self.save()?;
        info!("Deleted bet {}", id);
        Ok(removed)
    }
}

/// User settings, mirrored to `userSettings.json`
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: UserSettings,
}

impl SettingsStore {
    /// Load settings, falling back to defaults when none were saved yet
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(SETTINGS_FILE);
        let settings = read_document::<UserSettings>(&path)?.unwrap_or_default();
        Ok(Self { path, settings })
    }

    pub fn settings(&self) -> &UserSettings {
        &self.settings
    }

    pub fn update(&mut self, patch: SettingsPatch) -> Result<&UserSettings> {
        self.settings.apply(patch);
        write_document(&self.path, &self.settings)?;
        info!("Settings saved");
        Ok(&self.settings)
    }

    /// Flip dark mode and persist; returns the new value
    pub fn toggle_dark_mode(&mut self) -> Result<bool> {
        let dark_mode = !self.settings.dark_mode;
        self.update(SettingsPatch {
            dark_mode: Some(dark_mode),
            ..Default::default()
        })?;
        Ok(dark_mode)
    }
}
