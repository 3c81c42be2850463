//! Server configuration from environment variables.
//!
//! | variable | default |
//! |---|---|
//! | `ROSTER_BIND` | `127.0.0.1:8000` |
//! | `ROSTER_DB_PATH` | `roster.sqlite3` (`:memory:` for an in-memory store) |
//! | `ROSTER_LOG_LEVEL` | `debug` in debug builds, `info` in release |
//! | `ROSTER_LOG_DIR` | unset: log to stderr |

use roster_core::db::DbLocation;
use roster_core::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

const DEFAULT_BIND: &str = "127.0.0.1:8000";
const DEFAULT_DB_PATH: &str = "roster.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub db: DbLocation,
    pub log_level: String,
    pub log_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBind { value: String, reason: String },
    EmptyDbPath,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBind { value, reason } => {
                write!(f, "ROSTER_BIND `{value}` is not a socket address: {reason}")
            }
            Self::EmptyDbPath => write!(f, "ROSTER_DB_PATH cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

impl ServerConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_text = lookup("ROSTER_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_text
            .trim()
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::InvalidBind {
                value: bind_text.clone(),
                reason: err.to_string(),
            })?;

        let db_text = lookup("ROSTER_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let db = DbLocation::parse(&db_text).ok_or(ConfigError::EmptyDbPath)?;

        let log_level = lookup("ROSTER_LOG_LEVEL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default_log_level().to_string());
        let log_dir = lookup("ROSTER_LOG_DIR").filter(|value| !value.trim().is_empty());

        Ok(Self {
            bind,
            db,
            log_level,
            log_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig};
    use roster_core::db::DbLocation;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.bind.to_string(), "127.0.0.1:8000");
        assert_eq!(config.db, DbLocation::File(PathBuf::from("roster.sqlite3")));
        assert_eq!(config.log_level, roster_core::default_log_level());
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("ROSTER_BIND", "0.0.0.0:9000"),
            ("ROSTER_DB_PATH", ":memory:"),
            ("ROSTER_LOG_LEVEL", "warn"),
            ("ROSTER_LOG_DIR", "/var/log/roster"),
        ]))
        .unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.db, DbLocation::Memory);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/roster"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ServerConfig::from_lookup(lookup_from(&[("ROSTER_BIND", "localhost")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBind { .. }));

        let err =
            ServerConfig::from_lookup(lookup_from(&[("ROSTER_DB_PATH", " ")])).unwrap_err();
        assert_eq!(err, ConfigError::EmptyDbPath);
    }
}
