//! Server configuration read from the environment.

use hexchess_core::{CheckmateRule, Rules};
use std::net::SocketAddr;
use thiserror::Error;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid SERVER_ADDR {value:?}: {source}")]
    InvalidAddr {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("Invalid HEXCHESS_CHECKMATE {0:?}, expected \"disabled\" or \"detect\"")]
    InvalidCheckmateRule(String),
}

/// Settings the server is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Tracing filter directive, e.g. `info` or `hexchess_server=debug`
    pub log_filter: String,
    /// Rules every new game is created with
    pub rules: Rules,
}

impl ServerConfig {
    /// Read `SERVER_ADDR`, `RUST_LOG` and `HEXCHESS_CHECKMATE`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr_value = lookup("SERVER_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_value
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                value: addr_value.clone(),
                source,
            })?;

        let log_filter = lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        let checkmate = match lookup("HEXCHESS_CHECKMATE") {
            None => CheckmateRule::default(),
            Some(value) => parse_checkmate_rule(&value)?,
        };

        Ok(Self {
            addr,
            log_filter,
            rules: Rules { checkmate },
        })
    }
}

fn parse_checkmate_rule(value: &str) -> Result<CheckmateRule, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "disabled" => Ok(CheckmateRule::Disabled),
        "detect" => Ok(CheckmateRule::Detect),
        _ => Err(ConfigError::InvalidCheckmateRule(value.to_string())),
    }
}
