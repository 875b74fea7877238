//! Configuration file support
//!
//! Settings live in `~/.navlayer/config.ini`:
//!
//! ```ini
//! [navigation]
//! access_token = pk.xxx
//! profile = driving-traffic
//! alternatives = true
//!
//! [accounts]
//! manage_sku = false
//!
//! [logging]
//! level = info
//! ```
//!
//! A missing file is not an error; every setting has a default.

mod file;
mod keys;

pub use file::{
    config_directory, config_file_path, AccountsSettings, ConfigFile, LoggingSettings,
    NavigationSettings, CONFIG_DIR_NAME, DEFAULT_LOG_LEVEL,
};
pub use keys::{ConfigKey, ConfigKeyError};

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error(transparent)]
    InvalidValue(#[from] ConfigKeyError),
}
