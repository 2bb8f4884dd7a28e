//! Server configuration, loaded once at startup.
//!
//! Every value is validated here so a misconfigured deployment fails before
//! binding a socket rather than on the first request.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use axum::http::HeaderValue;

use crate::auth::jwt::JwtConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Source of configuration values. The process environment in production,
/// a map in tests.
pub trait EnvLookup {
    /// Value of `key`, with empty strings treated as unset.
    fn get(&self, key: &str) -> Option<String>;

    /// Parse `key`, or return `default` when it is unset.
    fn parse_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.get(key) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                var: key,
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}

/// Reads from `std::env`.
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl EnvLookup for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).filter(|v| !v.is_empty()).cloned()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Allowed CORS origins, from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long to wait for background tasks after the server stops.
    pub shutdown_timeout_secs: u64,
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&ProcessEnv)
    }

    /// Load and validate configuration.
    ///
    /// | Env Var                 | Required | Default                 |
    /// |-------------------------|----------|-------------------------|
    /// | `DATABASE_URL`          | **yes**  | --                      |
    /// | `JWT_SECRET`            | **yes**  | --                      |
    /// | `HOST`                  | no       | `0.0.0.0`               |
    /// | `PORT`                  | no       | `3000`                  |
    /// | `CORS_ORIGINS`          | no       | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | no       | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | no       | `10`                    |
    pub fn from_lookup(env: &impl EnvLookup) -> Result<Self, ConfigError> {
        let database_url = env.get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let host = env.get("HOST").unwrap_or_else(|| "0.0.0.0".into());
        if host.parse::<std::net::IpAddr>().is_err() {
            return Err(ConfigError::Invalid {
                var: "HOST",
                reason: format!("'{host}' is not an IP address"),
            });
        }

        let port: u16 = env.parse_or("PORT", 3000)?;

        let cors_origins: Vec<String> = env
            .get("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            if HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    reason: format!("'{origin}' is not a valid origin"),
                });
            }
        }

        let request_timeout_secs: u64 = env.parse_or("REQUEST_TIMEOUT_SECS", 30)?;
        let shutdown_timeout_secs: u64 = env.parse_or("SHUTDOWN_TIMEOUT_SECS", 10)?;

        let jwt = JwtConfig::from_lookup(env)?;

        Ok(Self {
            host,
            port,
            database_url,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
        })
    }
}
