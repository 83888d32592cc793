//! Configuration loading for the Huddle service.
//!
//! The configuration lives in `huddle-config.yaml`. Every field has a
//! default, so a missing file or a partial file is fine. Environment
//! variables override the network and storage settings so a deployment
//! can move the service without editing YAML:
//!
//! - `HUDDLE_HOST` overrides `server.host`
//! - `HUDDLE_PORT` overrides `server.port`
//! - `HUDDLE_STORE_PATH` overrides `store.path`

use std::path::{Path, PathBuf};

use huddle_types::TeamId;
use serde::Deserialize;

use crate::roster::Roster;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configured team list is empty.
    #[error("the team roster is empty")]
    EmptyRoster,

    /// A team is listed more than once.
    #[error("team {0} is listed more than once")]
    DuplicateTeam(TeamId),

    /// An override or field value could not be interpreted.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration, mirroring `huddle-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HuddleConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Counter store settings.
    #[serde(default)]
    pub store: StoreSection,

    /// Teams in play, in display order.
    #[serde(default = "default_teams")]
    pub teams: Vec<TeamId>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for HuddleConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            store: StoreSection::default(),
            teams: default_teams(),
            logging: LoggingConfig::default(),
        }
    }
}

impl HuddleConfig {
    /// Load configuration from a YAML file and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if an override cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if an override cannot be parsed.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_file`] when the file exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.apply_overrides(|key| std::env::var(key).ok())?;
            Ok(config)
        }
    }

    /// Apply overrides looked up through `lookup` (normally the process
    /// environment).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `HUDDLE_PORT` is not a port number.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HUDDLE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("HUDDLE_PORT") {
            self.server.port = port
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("invalid HUDDLE_PORT {port:?}: {e}")))?;
        }
        if let Some(path) = lookup("HUDDLE_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }
        Ok(())
    }

    /// Validate the team list into a [`Roster`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyRoster`] or [`ConfigError::DuplicateTeam`].
    pub fn roster(&self) -> Result<Roster, ConfigError> {
        Roster::new(self.teams.clone())
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Counter store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreSection {
    /// Path of the JSON counter record.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_teams() -> Vec<TeamId> {
    TeamId::ALL.to_vec()
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    3001
}

fn default_store_path() -> PathBuf {
    PathBuf::from("db.json")
}

fn default_log_level() -> String {
    String::from("info")
}
