use chrono::Duration;
use std::env;
use thiserror::Error;

use crate::auth::routes::DEFAULT_PUBLIC_ROUTES;

const DEFAULT_JWT_EXPIRATION_MS: i64 = 60 * 60 * 1000;
const DEFAULT_BCRYPT_COST: u32 = 12;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process-wide settings, read once at start-up.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_expiration: Duration,
    pub public_routes: Vec<String>,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let server_port = match lookup("SERVER_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "SERVER_PORT",
                reason: "must be a number".into(),
            })?,
            None => 8080,
        };

        let expiration_ms = match lookup("JWT_EXPIRATION_MS") {
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| ConfigError::Invalid {
                name: "JWT_EXPIRATION_MS",
                reason: "must be a number of milliseconds".into(),
            })?,
            None => DEFAULT_JWT_EXPIRATION_MS,
        };
        // Token timestamps have whole-second precision.
        if expiration_ms < 1000 {
            return Err(ConfigError::Invalid {
                name: "JWT_EXPIRATION_MS",
                reason: "must be at least 1000".into(),
            });
        }

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(raw) => raw.trim().parse::<u32>().ok().filter(|c| (4..=31).contains(c)).ok_or(
                ConfigError::Invalid {
                    name: "BCRYPT_COST",
                    reason: "must be between 4 and 31".into(),
                },
            )?,
            None => DEFAULT_BCRYPT_COST,
        };

        let public_routes = match lookup("PUBLIC_ROUTES") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_PUBLIC_ROUTES.iter().map(|p| p.to_string()).collect(),
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_port,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration: Duration::milliseconds(expiration_ms),
            public_routes,
            bcrypt_cost,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://test");
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.server_host, "127.0.0.1");
        assert_eq!(config.jwt_expiration, Duration::hours(1));
        assert_eq!(config.bcrypt_cost, 12);
        assert_eq!(config.public_routes.len(), DEFAULT_PUBLIC_ROUTES.len());
        assert_eq!(config.server_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_config_custom_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://test"),
            ("JWT_SECRET", "secret"),
            ("SERVER_PORT", "3000"),
            ("SERVER_HOST", "0.0.0.0"),
            ("JWT_EXPIRATION_MS", "90000"),
            ("PUBLIC_ROUTES", "/api/auth/**, /status ,"),
            ("BCRYPT_COST", "10"),
        ]))
        .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.server_host, "0.0.0.0");
        assert_eq!(config.jwt_expiration, Duration::seconds(90));
        assert_eq!(config.public_routes, vec!["/api/auth/**", "/status"]);
        assert_eq!(config.bcrypt_cost, 10);
    }

    #[test]
    fn test_config_rejects_missing_or_invalid_values() {
        let missing_secret = Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")]));
        assert_eq!(missing_secret.unwrap_err(), ConfigError::Missing("JWT_SECRET"));

        let blank_secret = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "   "),
        ]));
        assert_eq!(blank_secret.unwrap_err(), ConfigError::Missing("JWT_SECRET"));

        for (key, value) in [
            ("SERVER_PORT", "eighty"),
            ("JWT_EXPIRATION_MS", "0"),
            ("JWT_EXPIRATION_MS", "-5"),
            ("JWT_EXPIRATION_MS", "500"),
            ("JWT_EXPIRATION_MS", "999"),
            ("BCRYPT_COST", "2"),
        ] {
            let result = Config::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://x"),
                ("JWT_SECRET", "secret"),
                (key, value),
            ]));
            assert!(
                matches!(result, Err(ConfigError::Invalid { name, .. }) if name == key),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn test_config_accepts_one_second_expiration() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "secret"),
            ("JWT_EXPIRATION_MS", "1000"),
        ]))
        .unwrap();
        assert_eq!(config.jwt_expiration, Duration::seconds(1));
    }
}
