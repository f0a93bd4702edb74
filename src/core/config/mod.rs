use log::warn;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::core::shared::error::{StoreError, StoreResult};
use crate::core::transaction::TransactionOptions;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub transactions: TransactionOptions,
    pub run_migrations: bool,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
    pub connect_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: 10,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and then reads the process environment.
    pub fn from_env() -> StoreResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads a dotenv file without modifying the process environment.
    pub fn from_env_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let mut values = HashMap::new();
        let entries = dotenvy::from_path_iter(path).map_err(|e| {
            StoreError::Initialization(format!("Cannot read {}: {e}", path.display()))
        })?;
        for entry in entries {
            let (key, value) = entry.map_err(|e| {
                StoreError::Initialization(format!("Invalid entry in {}: {e}", path.display()))
            })?;
            values.insert(key, value);
        }
        Self::from_lookup(|key| values.get(key).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> StoreResult<Self> {
        let url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| StoreError::Initialization("DATABASE_URL is not set".to_string()))?;

        let defaults = TransactionOptions::default();
        let max_wait_ms: u64 = parse_or(
            &lookup,
            "TRANSACTION_MAX_WAIT_MS",
            defaults.max_wait.as_millis() as u64,
        )?;
        let timeout_ms: u64 = parse_or(
            &lookup,
            "TRANSACTION_TIMEOUT_MS",
            defaults.timeout.as_millis() as u64,
        )?;

        let pool_size: u32 = parse_or(&lookup, "DATABASE_POOL_SIZE", 10)?;
        if pool_size == 0 {
            return Err(StoreError::Initialization(
                "DATABASE_POOL_SIZE must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database: DatabaseConfig {
                url,
                pool_size,
                connect_timeout: Duration::from_secs(parse_or(
                    &lookup,
                    "DATABASE_CONNECT_TIMEOUT_SECS",
                    10,
                )?),
            },
            transactions: TransactionOptions {
                max_wait: Duration::from_millis(max_wait_ms),
                timeout: Duration::from_millis(timeout_ms),
                isolation_level: defaults.isolation_level,
            },
            run_migrations: parse_flag(&lookup, "RUN_MIGRATIONS", true),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> StoreResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().map_err(|e| {
            StoreError::Initialization(format!("Invalid value for {key} ({raw}): {e}"))
        }),
        _ => Ok(default),
    }
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => true,
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => false,
        Some(v) => {
            warn!("Ignoring unrecognised {key}={v}, using {default}");
            default
        }
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/clips")]))
                .unwrap();
        assert_eq!(config.database.url, "postgres://localhost/clips");
        assert_eq!(config.database.pool_size, 10);
        assert_eq!(config.database.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.transactions.max_wait, Duration::from_millis(2000));
        assert_eq!(config.transactions.timeout, Duration::from_millis(5000));
        assert!(config.transactions.isolation_level.is_none());
        assert!(config.run_migrations);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/clips"),
            ("DATABASE_POOL_SIZE", "4"),
            ("TRANSACTION_TIMEOUT_MS", "15000"),
            ("RUN_MIGRATIONS", "off"),
        ]))
        .unwrap();
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.transactions.timeout, Duration::from_secs(15));
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_missing_url_is_initialization_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, StoreError::Initialization(_)));
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/clips"),
            ("DATABASE_POOL_SIZE", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DATABASE_POOL_SIZE"));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://db/clips"),
            ("DATABASE_POOL_SIZE", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_from_env_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "DATABASE_URL=postgres://clips:pw@localhost/clips").unwrap();
        writeln!(file, "TRANSACTION_MAX_WAIT_MS=500").unwrap();
        file.flush().unwrap();

        let config = AppConfig::from_env_file(file.path()).unwrap();
        assert_eq!(config.database.url, "postgres://clips:pw@localhost/clips");
        assert_eq!(config.transactions.max_wait, Duration::from_millis(500));
    }

    #[test]
    fn test_from_missing_env_file() {
        let err = AppConfig::from_env_file("/nonexistent/clipstore.env").unwrap_err();
        assert!(matches!(err, StoreError::Initialization(_)));
    }
}
