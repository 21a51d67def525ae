//! Core configuration types and loading.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::instance::InstanceSettings;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Process configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// World instances hosted by this process.
    #[serde(default)]
    pub instances: Vec<InstanceSettings>,
    /// Permission groups shared by all instances.
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    /// Item bans shared by all instances.
    #[serde(default)]
    pub item_bans: Vec<ItemBanConfig>,
    /// Seed accounts loaded into the account store at startup.
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
    #[serde(default)]
    pub saves: SavesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations no instance could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for instance in &self.instances {
            if instance.name.is_empty() {
                return Err(ConfigError::Invalid("instance name is required".into()));
            }
            if !names.insert(instance.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate instance name: {}",
                    instance.name
                )));
            }
            if instance.max_players == 0 {
                return Err(ConfigError::Invalid(format!(
                    "instance {} has max_players = 0",
                    instance.name
                )));
            }
            if instance.world.width <= 0 || instance.world.height <= 0 {
                return Err(ConfigError::Invalid(format!(
                    "instance {} has an empty world",
                    instance.name
                )));
            }
        }

        let groups: HashSet<&str> = self.groups.iter().map(|g| g.name.as_str()).collect();
        for group in &self.groups {
            if let Some(parent) = &group.parent
                && !groups.contains(parent.as_str())
            {
                return Err(ConfigError::Invalid(format!(
                    "group {} has unknown parent {}",
                    group.name, parent
                )));
            }
        }
        Ok(())
    }

    /// Settings of the instance with the given name.
    pub fn instance(&self, name: &str) -> Option<&InstanceSettings> {
        self.instances.iter().find(|i| i.name == name)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// World save location.
#[derive(Debug, Clone, Deserialize)]
pub struct SavesConfig {
    /// Directory holding `<instance>.world` snapshots (default: "saves").
    #[serde(default = "default_saves_directory")]
    pub directory: PathBuf,
}

impl Default for SavesConfig {
    fn default() -> Self {
        Self {
            directory: default_saves_directory(),
        }
    }
}

fn default_saves_directory() -> PathBuf {
    PathBuf::from("saves")
}

/// A permission group.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    /// Group whose permissions are inherited.
    #[serde(default)]
    pub parent: Option<String>,
    /// Permission names; `*` grants everything.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// A banned item.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemBanConfig {
    /// Item display name as matched by the ban list.
    pub item: String,
    /// Groups allowed to use the item anyway.
    #[serde(default)]
    pub allowed_groups: Vec<String>,
}

/// A pre-provisioned user account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    pub name: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    #[serde(default = "default_account_group")]
    pub group: String,
    /// Known client fingerprints for automatic login.
    #[serde(default)]
    pub fingerprints: Vec<String>,
}

fn default_account_group() -> String {
    "default".to_string()
}
