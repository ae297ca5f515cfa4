//! TOML-based application configuration.
//!
//! Stores:
//! - Storage locations and key prefixes for both tiers
//! - Cooldown window length
//! - Streak-at-risk warning window
//!
//! Configuration is stored at `~/.config/claimstreak/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::cooldown::{DEFAULT_COOLDOWN_HOURS, DEFAULT_COOLDOWN_PREFIX};
use crate::error::ConfigError;
use crate::storage::durable::DEFAULT_RECORD_PREFIX;
use crate::streak::DEFAULT_RISK_WINDOW_HOURS;

/// Longest accepted cooldown window: one year.
pub const MAX_COOLDOWN_HOURS: u32 = 24 * 365;

/// Storage locations, relative to the data directory unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_primary_db")]
    pub primary_db: String,
    #[serde(default = "default_fallback_file")]
    pub fallback_file: String,
    #[serde(default = "default_record_prefix")]
    pub record_prefix: String,
    #[serde(default = "default_cooldown_prefix")]
    pub cooldown_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownConfig {
    #[serde(default = "default_period_hours")]
    pub period_hours: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default = "default_risk_warning_hours")]
    pub risk_warning_hours: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/claimstreak/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub cooldown: CooldownConfig,
    #[serde(default)]
    pub streak: StreakConfig,
}

fn default_primary_db() -> String {
    "claims.db".into()
}
fn default_fallback_file() -> String {
    "claims-fallback.json".into()
}
fn default_record_prefix() -> String {
    DEFAULT_RECORD_PREFIX.into()
}
fn default_cooldown_prefix() -> String {
    DEFAULT_COOLDOWN_PREFIX.into()
}
fn default_period_hours() -> u32 {
    DEFAULT_COOLDOWN_HOURS as u32
}
fn default_risk_warning_hours() -> u32 {
    DEFAULT_RISK_WINDOW_HOURS as u32
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            primary_db: default_primary_db(),
            fallback_file: default_fallback_file(),
            record_prefix: default_record_prefix(),
            cooldown_prefix: default_cooldown_prefix(),
        }
    }
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            period_hours: default_period_hours(),
        }
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            risk_warning_hours: default_risk_warning_hours(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".into(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from disk, writing defaults on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// fails validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)
                    .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "using default configuration");
            Self::default()
        })
    }

    /// Reject values that would make the stores or timers meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_empty = [
            ("storage.primary_db", &self.storage.primary_db),
            ("storage.fallback_file", &self.storage.fallback_file),
            ("storage.record_prefix", &self.storage.record_prefix),
            ("storage.cooldown_prefix", &self.storage.cooldown_prefix),
        ];
        for (key, value) in non_empty {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "must not be empty".into(),
                });
            }
        }
        if self.storage.record_prefix == self.storage.cooldown_prefix {
            return Err(ConfigError::InvalidValue {
                key: "storage.cooldown_prefix".into(),
                message: "must differ from storage.record_prefix".into(),
            });
        }
        if self.cooldown.period_hours == 0 || self.cooldown.period_hours > MAX_COOLDOWN_HOURS {
            return Err(ConfigError::InvalidValue {
                key: "cooldown.period_hours".into(),
                message: format!("must be between 1 and {MAX_COOLDOWN_HOURS}"),
            });
        }
        if self.streak.risk_warning_hours > 24 {
            return Err(ConfigError::InvalidValue {
                key: "streak.risk_warning_hours".into(),
                message: "must be at most 24".into(),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed or
    /// fails validation, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let updated = self.with_value(key, value)?;
        updated.save()?;
        *self = updated;
        Ok(())
    }

    /// Copy of this config with one dot-path value replaced, validated.
    pub fn with_value(&self, key: &str, value: &str) -> Result<Self, ConfigError> {
        let mut json =
            serde_json::to_value(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        Ok(updated)
    }

    /// Resolve a configured file name against the data directory.
    pub fn resolve_path(file: &str) -> Result<PathBuf, std::io::Error> {
        let path = PathBuf::from(file);
        if path.is_absolute() {
            Ok(path)
        } else {
            Ok(data_dir()?.join(path))
        }
    }

    pub fn cooldown_period(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.cooldown.period_hours))
    }

    pub fn risk_window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.streak.risk_warning_hours))
    }
}
