//! Database configuration loaded from the environment.

use std::time::Duration;

use crate::error::ConfigError;

const IN_MEMORY_URL: &str = "sqlite::memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// SQLite connection URL, e.g. `sqlite://xpoll.db`
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Reads `DATABASE_*` variables, loading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").ok_or(ConfigError::MissingRequired("DATABASE_URL"))?;
        let defaults = Self::default();

        let config = Self {
            url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.max_connections)?,
            acquire_timeout_secs: parse_or(
                &lookup,
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            )?,
            idle_timeout_secs: parse_or(
                &lookup,
                "DATABASE_IDLE_TIMEOUT_SECS",
                defaults.idle_timeout_secs,
            )?,
            max_lifetime_secs: parse_or(
                &lookup,
                "DATABASE_MAX_LIFETIME_SECS",
                defaults.max_lifetime_secs,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    /// A private database that lives as long as the pool opened on it.
    pub fn in_memory() -> Self {
        Self {
            url: IN_MEMORY_URL.to_string(),
            ..Default::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::MissingRequired("DATABASE_URL"));
        }
        if !self.url.starts_with("sqlite:") {
            return Err(ConfigError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidPoolSize);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 20,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 10 * 60,
            max_lifetime_secs: 30 * 60,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_url_is_set() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "sqlite://xpoll.db",
        )]))
        .unwrap();

        assert_eq!(config.url, "sqlite://xpoll.db");
        assert_eq!(config.max_connections, 20);
        assert_eq!(config.idle_timeout(), Duration::from_secs(600));
        assert_eq!(config.max_lifetime(), Duration::from_secs(1800));
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("DATABASE_ACQUIRE_TIMEOUT_SECS", " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.max_connections, 4);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(5));
        assert!(config.is_in_memory());
    }

    #[test]
    fn test_missing_url() {
        let err = DatabaseConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired("DATABASE_URL")));
    }

    #[test]
    fn test_unparseable_number() {
        let err = DatabaseConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite://xpoll.db"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ]))
        .unwrap_err();

        match err {
            ConfigError::InvalidValue { key, value } => {
                assert_eq!(key, "DATABASE_MAX_CONNECTIONS");
                assert_eq!(value, "many");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validation_rejects_other_engines() {
        let config = DatabaseConfig {
            url: "postgres://localhost/xpoll".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDatabaseUrl)
        ));
    }

    #[test]
    fn test_validation_rejects_empty_pool() {
        let config = DatabaseConfig {
            max_connections: 0,
            ..DatabaseConfig::in_memory()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPoolSize)));
    }
}
