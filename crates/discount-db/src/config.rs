//! Process configuration for the discount binaries.
//!
//! Loaded from environment variables with fallback to defaults.
//!
//! | Variable                          | Default          |
//! |-----------------------------------|------------------|
//! | `DISCOUNT_DB_PATH`                | `./discounts.db` |
//! | `DISCOUNT_DB_MAX_CONNECTIONS`     | `5`              |
//! | `DISCOUNT_REJECT_UNKNOWN_CODES`   | `true`           |
//! | `DISCOUNT_ENFORCE_COMBINATION`    | `false`          |
//! | `DISCOUNT_MAX_CODES_PER_REQUEST`  | `10`             |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use discount_core::config::DEFAULT_MAX_CODES_PER_REQUEST;
use discount_core::CalculatorConfig;

use crate::pool::DbConfig;

pub const DEFAULT_DB_PATH: &str = "./discounts.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration for a process that prices carts against the SQLite store.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Calculator behaviour
    pub calculator: CalculatorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            calculator: CalculatorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = AppConfig {
            db_path: lookup("DISCOUNT_DB_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),

            max_connections: parse_or(&lookup, "DISCOUNT_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,

            calculator: CalculatorConfig::default()
                .reject_unknown_codes(parse_or(&lookup, "DISCOUNT_REJECT_UNKNOWN_CODES", true)?)
                .enforce_combination_rules(parse_or(&lookup, "DISCOUNT_ENFORCE_COMBINATION", false)?)
                .max_codes_per_request(parse_or(
                    &lookup,
                    "DISCOUNT_MAX_CODES_PER_REQUEST",
                    DEFAULT_MAX_CODES_PER_REQUEST,
                )?),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "DISCOUNT_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path).max_connections(self.max_connections)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.calculator.reject_unknown_codes);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DISCOUNT_DB_PATH", "/var/lib/discounts.db"),
            ("DISCOUNT_DB_MAX_CONNECTIONS", "8"),
            ("DISCOUNT_REJECT_UNKNOWN_CODES", "false"),
            ("DISCOUNT_ENFORCE_COMBINATION", "true"),
            ("DISCOUNT_MAX_CODES_PER_REQUEST", "3"),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/discounts.db"));
        assert_eq!(config.db_config().max_connections, 8);
        assert!(!config.calculator.reject_unknown_codes);
        assert!(config.calculator.enforce_combination_rules);
        assert_eq!(config.calculator.max_codes_per_request, 3);
    }

    #[rstest]
    #[case("DISCOUNT_ENFORCE_COMBINATION", "yes")]
    #[case("DISCOUNT_REJECT_UNKNOWN_CODES", "1")]
    #[case("DISCOUNT_DB_MAX_CONNECTIONS", "0")]
    #[case("DISCOUNT_DB_MAX_CONNECTIONS", "many")]
    #[case("DISCOUNT_MAX_CODES_PER_REQUEST", "-1")]
    fn test_invalid_values(#[case] key: &str, #[case] value: &str) {
        let err = AppConfig::from_lookup(lookup(&[(key, value)])).unwrap_err();
        assert_eq!(err.to_string(), format!("Invalid value for {key}"));
    }

    #[test]
    fn test_blank_path_falls_back() {
        let config = AppConfig::from_lookup(lookup(&[("DISCOUNT_DB_PATH", "  ")])).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
    }
}
