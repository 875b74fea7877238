//! Typed access to individual configuration settings.
//!
//! Every setting is addressed as `section.key`, e.g.
//! `navigation.access_token`. The same table drives file loading, saving,
//! and the `config get/set/list` commands.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFile;
use crate::navigation::RoutingProfile;

/// Levels accepted by `logging.level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Error when reading or writing a configuration key.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigKeyError {
    /// No setting has this name.
    UnknownKey(String),
    /// The value does not parse for this setting.
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKeyError::UnknownKey(key) => write!(f, "Unknown configuration key: {}", key),
            ConfigKeyError::InvalidValue { key, value, reason } => {
                write!(f, "Invalid value '{}' for {}: {}", value, key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigKeyError {}

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    NavigationAccessToken,
    NavigationBaseUrl,
    NavigationProfile,
    NavigationAlternatives,
    NavigationArrivalRadius,
    NavigationTimeout,
    AccountsManageSku,
    AccountsTokenStore,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// All keys, grouped by section in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::NavigationAccessToken,
            ConfigKey::NavigationBaseUrl,
            ConfigKey::NavigationProfile,
            ConfigKey::NavigationAlternatives,
            ConfigKey::NavigationArrivalRadius,
            ConfigKey::NavigationTimeout,
            ConfigKey::AccountsManageSku,
            ConfigKey::AccountsTokenStore,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::NavigationAccessToken
            | ConfigKey::NavigationBaseUrl
            | ConfigKey::NavigationProfile
            | ConfigKey::NavigationAlternatives
            | ConfigKey::NavigationArrivalRadius
            | ConfigKey::NavigationTimeout => "navigation",
            ConfigKey::AccountsManageSku | ConfigKey::AccountsTokenStore => "accounts",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::NavigationAccessToken => "access_token",
            ConfigKey::NavigationBaseUrl => "base_url",
            ConfigKey::NavigationProfile => "profile",
            ConfigKey::NavigationAlternatives => "alternatives",
            ConfigKey::NavigationArrivalRadius => "arrival_radius_m",
            ConfigKey::NavigationTimeout => "timeout_secs",
            ConfigKey::AccountsManageSku => "manage_sku",
            ConfigKey::AccountsTokenStore => "token_store",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a string; empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        let nav = &config.navigation;
        match self {
            ConfigKey::NavigationAccessToken => nav.access_token.clone().unwrap_or_default(),
            ConfigKey::NavigationBaseUrl => nav.base_url.clone(),
            ConfigKey::NavigationProfile => nav.profile.to_string(),
            ConfigKey::NavigationAlternatives => nav.alternatives.to_string(),
            ConfigKey::NavigationArrivalRadius => nav.arrival_radius_m.to_string(),
            ConfigKey::NavigationTimeout => nav.timeout_secs.to_string(),
            ConfigKey::AccountsManageSku => config
                .accounts
                .manage_sku
                .map(|v| v.to_string())
                .unwrap_or_default(),
            ConfigKey::AccountsTokenStore => config.accounts.token_store.display().to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config
                .logging
                .directory
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_default(),
        }
    }

    /// Validates `value` and stores it. An empty value clears optional
    /// settings.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigKeyError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        };

        match self {
            ConfigKey::NavigationAccessToken => {
                config.navigation.access_token = non_empty(value).map(str::to_string);
            }
            ConfigKey::NavigationBaseUrl => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    return Err(invalid("must start with http:// or https://"));
                }
                config.navigation.base_url = value.trim_end_matches('/').to_string();
            }
            ConfigKey::NavigationProfile => {
                config.navigation.profile =
                    value.parse::<RoutingProfile>().map_err(|e| invalid(&e))?;
            }
            ConfigKey::NavigationAlternatives => {
                config.navigation.alternatives =
                    parse_bool(value).ok_or_else(|| invalid("expected true or false"))?;
            }
            ConfigKey::NavigationArrivalRadius => {
                let radius: f64 = value
                    .parse()
                    .map_err(|_| invalid("expected a number of meters"))?;
                if !radius.is_finite() || radius <= 0.0 {
                    return Err(invalid("must be a positive number"));
                }
                config.navigation.arrival_radius_m = radius;
            }
            ConfigKey::NavigationTimeout => {
                let secs: u64 = value.parse().map_err(|_| invalid("expected whole seconds"))?;
                if secs == 0 {
                    return Err(invalid("must be at least 1"));
                }
                config.navigation.timeout_secs = secs;
            }
            ConfigKey::AccountsManageSku => {
                config.accounts.manage_sku = match non_empty(value) {
                    None => None,
                    Some(v) => {
                        Some(parse_bool(v).ok_or_else(|| invalid("expected true or false"))?)
                    }
                };
            }
            ConfigKey::AccountsTokenStore => {
                let path = non_empty(value).ok_or_else(|| invalid("path must not be empty"))?;
                config.accounts.token_store = PathBuf::from(path);
            }
            ConfigKey::LoggingLevel => {
                let level = value.to_ascii_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(invalid("expected trace, debug, info, warn or error"));
                }
                config.logging.level = level;
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = non_empty(value).map(PathBuf::from);
            }
        }
        Ok(())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        assert_eq!(
            "navigation.access_token".parse::<ConfigKey>().unwrap(),
            ConfigKey::NavigationAccessToken
        );
        assert_eq!(
            "Accounts.Manage_Sku".parse::<ConfigKey>().unwrap(),
            ConfigKey::AccountsManageSku
        );
        assert!(matches!(
            "navigation.nope".parse::<ConfigKey>(),
            Err(ConfigKeyError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_every_key_round_trips_its_name() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
    }

    #[test]
    fn test_set_manage_sku() {
        let mut config = ConfigFile::default();
        ConfigKey::AccountsManageSku.set(&mut config, "yes").unwrap();
        assert_eq!(config.accounts.manage_sku, Some(true));
        assert_eq!(ConfigKey::AccountsManageSku.get(&config), "true");

        ConfigKey::AccountsManageSku.set(&mut config, "").unwrap();
        assert_eq!(config.accounts.manage_sku, None);
        assert_eq!(ConfigKey::AccountsManageSku.get(&config), "");
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::NavigationProfile.set(&mut config, "flying").is_err());
        assert!(ConfigKey::NavigationArrivalRadius.set(&mut config, "-3").is_err());
        assert!(ConfigKey::NavigationTimeout.set(&mut config, "0").is_err());
        assert!(ConfigKey::NavigationBaseUrl.set(&mut config, "ftp://x").is_err());
        assert!(ConfigKey::LoggingLevel.set(&mut config, "loud").is_err());
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let mut config = ConfigFile::default();
        ConfigKey::NavigationBaseUrl
            .set(&mut config, "http://localhost:8080/")
            .unwrap();
        assert_eq!(config.navigation.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_error_display() {
        let err = ConfigKey::NavigationTimeout
            .set(&mut ConfigFile::default(), "soon")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value 'soon' for navigation.timeout_secs: expected whole seconds"
        );
    }
}
