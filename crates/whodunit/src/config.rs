//! Server configuration: `whodunit.toml`, then environment overrides.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File read when no explicit path is given. Missing is fine.
pub const DEFAULT_CONFIG_FILE: &str = "whodunit.toml";

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("bind_addr {0:?} is not a valid socket address")]
    InvalidBindAddr(String),

    #[error("room_channel_size must be > 0")]
    ZeroChannelSize,
}

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    /// Secret required to claim the game-master seat. `None` lets anyone
    /// claim it.
    pub master_passphrase: Option<String>,
    /// Capacity of the room's command queue.
    pub room_channel_size: usize,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            master_passphrase: None,
            room_channel_size: 64,
            log_filter: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Loads `path`, or [`DEFAULT_CONFIG_FILE`] if it exists, then applies
    /// environment overrides.
    ///
    /// # Errors
    /// - [`ConfigError::Read`] if an explicit `path` cannot be read
    /// - [`ConfigError::Parse`] if the file is not valid TOML for this shape
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parses one TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `WHODUNIT_*` overrides. `lookup` is `std::env::var` outside
    /// tests. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty =
            |key: &str| lookup(key).filter(|value| !value.is_empty());
        if let Some(addr) = non_empty("WHODUNIT_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(secret) = non_empty("WHODUNIT_MASTER_PASSPHRASE") {
            self.master_passphrase = Some(secret);
        }
    }

    /// Applies command-line overrides, which win over both the file and
    /// the environment.
    pub fn apply_cli(&mut self, bind: Option<String>) {
        if let Some(addr) = bind {
            self.bind_addr = addr;
        }
    }

    /// Filter directive for the log subscriber: `rust_log` (the `RUST_LOG`
    /// variable) when set and non-blank, otherwise [`Self::log_filter`].
    pub fn log_directive(&self, rust_log: Option<String>) -> String {
        rust_log
            .filter(|directive| !directive.trim().is_empty())
            .unwrap_or_else(|| self.log_filter.clone())
    }

    /// Rejects settings the server cannot start with, and warns about
    /// risky ones.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::InvalidBindAddr(self.bind_addr.clone()));
        }
        if self.room_channel_size == 0 {
            return Err(ConfigError::ZeroChannelSize);
        }
        if self.master_passphrase.is_none() {
            tracing::warn!(
                "no master_passphrase configured, anyone may claim the game master seat"
            );
        }
        Ok(())
    }
}
