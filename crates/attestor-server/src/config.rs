//! Server configuration from the environment
//!
//! | Variable | Default |
//! |---|---|
//! | `ATTESTOR_BIND` | `0.0.0.0` |
//! | `ATTESTOR_PORT` | `8080` |
//! | `ATTESTOR_LOG_LEVEL` | `info` |
//! | `ATTESTOR_RECENT_LIMIT` | `30` |
//! | `DATABASE_URL` | unset (in-memory store) |

use std::env;
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;

use crate::pipeline::DEFAULT_RECENT_LIMIT;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub log_level: Level,
    pub recent_limit: usize,
    pub database_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
            log_level: Level::INFO,
            recent_limit: DEFAULT_RECENT_LIMIT,
            database_url: None,
        }
    }
}

impl ServerConfig {
    /// Load from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let recent_limit = parse(&lookup, "ATTESTOR_RECENT_LIMIT", defaults.recent_limit)?;
        if recent_limit == 0 {
            return Err(ConfigError::Invalid {
                var: "ATTESTOR_RECENT_LIMIT",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            bind: lookup("ATTESTOR_BIND").unwrap_or(defaults.bind),
            port: parse(&lookup, "ATTESTOR_PORT", defaults.port)?,
            log_level: parse(&lookup, "ATTESTOR_LOG_LEVEL", defaults.log_level)?,
            recent_limit,
            database_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
        })
    }

    /// Socket address to listen on
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn parse<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
    }
}
