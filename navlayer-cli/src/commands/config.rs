//! `navlayer config`: read and edit `~/.navlayer/config.ini`.
//!
//! Each subcommand renders its output as a string first so the same code
//! path can be exercised against a temporary file.

use std::path::Path;

use clap::Subcommand;
use console::style;
use navlayer::config::{config_file_path, ConfigError, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Characters of the access token left visible in listings.
const TOKEN_PREFIX_SHOWN: usize = 6;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting, e.g. `navigation.profile`
    Get { key: String },

    /// Change one setting; an empty value clears optional settings
    Set { key: String, value: String },

    /// Print every setting by section (the access token is masked)
    List,

    /// Print the location of the configuration file
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let output = execute(command, &config_file_path())?;
    println!("{}", output);
    Ok(())
}

fn execute(command: ConfigCommands, path: &Path) -> Result<String, CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let value = lookup(&key)?.get(&ConfigFile::load_from(path)?);
            Ok(if value.is_empty() {
                "(not set)".to_string()
            } else {
                value
            })
        }
        ConfigCommands::Set { key, value } => {
            let key = lookup(&key)?;
            let mut config = ConfigFile::load_from(path)?;
            key.set(&mut config, &value).map_err(ConfigError::from)?;
            config.save_to(path)?;
            tracing::info!(key = %key, path = %path.display(), "Configuration updated");
            Ok(format!("{} = {}", key, displayed(key, &key.get(&config))))
        }
        ConfigCommands::List => Ok(listing(&ConfigFile::load_from(path)?)),
        ConfigCommands::Path => Ok(path.display().to_string()),
    }
}

fn lookup(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        let known: Vec<String> = ConfigKey::all().iter().map(ConfigKey::name).collect();
        CliError::InvalidArgument(format!(
            "no setting named '{}' (known: {})",
            key,
            known.join(", ")
        ))
    })
}

/// The value as printed by `set` and `list`.
fn displayed(key: ConfigKey, value: &str) -> String {
    if value.is_empty() {
        return style("(not set)").dim().to_string();
    }
    if key == ConfigKey::NavigationAccessToken && value.chars().count() > TOKEN_PREFIX_SHOWN {
        let prefix: String = value.chars().take(TOKEN_PREFIX_SHOWN).collect();
        return format!("{}****", prefix);
    }
    value.to_string()
}

fn listing(config: &ConfigFile) -> String {
    let mut lines = Vec::new();
    let mut section = "";
    for key in ConfigKey::all() {
        if key.section() != section {
            if !section.is_empty() {
                lines.push(String::new());
            }
            section = key.section();
            lines.push(style(format!("[{}]", section)).bold().to_string());
        }
        lines.push(format!("  {} = {}", key.key_name(), displayed(*key, &key.get(config))));
    }
    lines.join("\n")
}
