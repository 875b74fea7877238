//! INI configuration file.

use std::path::{Path, PathBuf};

use ini::Ini;

use super::keys::ConfigKey;
use super::ConfigError;
use crate::directions::DEFAULT_TIMEOUT_SECS;
use crate::navigation::{RoutingProfile, DEFAULT_ARRIVAL_RADIUS_M, DEFAULT_BASE_URL};

/// Name of the per-user configuration directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".navlayer";

/// Default log level when neither the file nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// `~/.navlayer`, or `./.navlayer` when there is no home directory.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// `~/.navlayer/config.ini`
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

/// `[navigation]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationSettings {
    pub access_token: Option<String>,
    pub base_url: String,
    pub profile: RoutingProfile,
    pub alternatives: bool,
    pub arrival_radius_m: f64,
    pub timeout_secs: u64,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            profile: RoutingProfile::default(),
            alternatives: true,
            arrival_radius_m: DEFAULT_ARRIVAL_RADIUS_M,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[accounts]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountsSettings {
    /// Trip billing when true; MAU billing when false or unset.
    pub manage_sku: Option<bool>,
    /// INI file holding issued billing tokens.
    pub token_store: PathBuf,
}

impl Default for AccountsSettings {
    fn default() -> Self {
        Self {
            manage_sku: None,
            token_store: config_directory().join("accounts.ini"),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    /// Directory for daily log files; console (stderr) only when unset.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub navigation: NavigationSettings,
    pub accounts: AccountsSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Loads `~/.navlayer/config.ini`, falling back to defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads `path`. A missing file yields the defaults; unknown keys are
    /// ignored.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = ConfigFile::default();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(config);
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Writes the configuration to `~/.navlayer/config.ini`.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Writes every set key to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        ini.write_to_file(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "Saved config file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(
            &path,
            "[navigation]\naccess_token = pk.abc\nprofile = walking\narrival_radius_m = 35\n\
             [accounts]\nmanage_sku = true\n[logging]\nlevel = debug\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.navigation.access_token.as_deref(), Some("pk.abc"));
        assert_eq!(config.navigation.profile, RoutingProfile::Walking);
        assert_eq!(config.navigation.arrival_radius_m, 35.0);
        assert_eq!(config.accounts.manage_sku, Some(true));
        assert_eq!(config.logging.level, "debug");
        assert!(config.navigation.alternatives);
    }

    #[test]
    fn test_invalid_value_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[navigation]\ntimeout_secs = soon\n").unwrap();

        assert!(matches!(
            ConfigFile::load_from(&path),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.navigation.access_token = Some("pk.saved".to_string());
        config.navigation.alternatives = false;
        config.logging.directory = Some(dir.path().join("logs"));
        config.save_to(&path).unwrap();

        let reloaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(reloaded, config);
    }
}
