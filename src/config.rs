//! Runtime configuration.
//!
//! Every field has a default, so an override document only needs the keys it
//! changes. In the browser the override is read from `localStorage`
//! (see [`CONFIG_STORAGE_KEY`]).

use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::accounts::storage::KeyValueStorage;
use crate::error::ConfigError;

/// Storage key holding an optional JSON override of [`GameConfig`].
pub const CONFIG_STORAGE_KEY: &str = "idle_clicker.config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Production ticks per simulated second (10 → one tick every 100ms).
    pub ticks_per_second: u32,
    /// Autosave cadence in milliseconds.
    pub autosave_interval_ms: u32,
    /// Upper bound on elapsed time consumed from a single frame.
    pub max_frame_delta_ms: f64,
    /// Persist immediately after every successful purchase.
    pub save_after_purchase: bool,
    pub log_level: LevelFilter,
    pub accounts: AccountPolicy,
}

/// Validation and hashing parameters for account creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountPolicy {
    pub min_username_len: usize,
    pub min_password_len: usize,
    pub hash_iterations: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 10,
            autosave_interval_ms: 5_000,
            max_frame_delta_ms: 500.0,
            save_after_purchase: true,
            log_level: LevelFilter::Info,
            accounts: AccountPolicy::default(),
        }
    }
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            min_username_len: 3,
            min_password_len: 6,
            hash_iterations: 10_000,
        }
    }
}

impl GameConfig {
    /// Parse a JSON override and validate the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus whatever override is stored under [`CONFIG_STORAGE_KEY`].
    /// An unreadable or invalid override is logged and ignored.
    pub fn load(storage: &impl KeyValueStorage) -> Self {
        match storage.get(CONFIG_STORAGE_KEY) {
            Ok(Some(raw)) => Self::from_json(&raw).unwrap_or_else(|e| {
                log::warn!("ignoring config override: {e}");
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("could not read config override: {e}");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_second == 0 {
            return Err(invalid("ticks_per_second must be at least 1"));
        }
        if self.ticks_per_second > 1_000 {
            return Err(invalid("ticks_per_second must not exceed 1000"));
        }
        if self.autosave_interval_ms == 0 {
            return Err(invalid("autosave_interval_ms must be at least 1"));
        }
        if !(self.max_frame_delta_ms.is_finite() && self.max_frame_delta_ms > 0.0) {
            return Err(invalid("max_frame_delta_ms must be a positive number"));
        }
        if self.accounts.hash_iterations == 0 {
            return Err(invalid("accounts.hash_iterations must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_string(),
    }
}
