//! Runtime configuration loaded from the process environment.
//!
//! A `.env` file in the working directory is honoured when present.

use std::env;
use std::ops::RangeInclusive;
use std::str::FromStr;

use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Secret used when none is configured outside production.
const DEVELOPMENT_SECRET: &str = "jobboard-development-secret";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 10;
const SESSION_EXPIRATION_RANGE: RangeInclusive<i64> = 1..=3650;

/// Deployment mode. Production switches session cookies to cross-site, secure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    #[strum(serialize = "development", serialize = "dev", serialize = "test")]
    Development,
    #[strum(serialize = "production", serialize = "prod")]
    Production,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Postgres connection string; the in-memory store is used when absent.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub secret_key: String,
    pub session_expiration_days: i64,
    pub environment: Environment,
    /// Empty means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Loads configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = match get("APP_ENV").or_else(|| get("NODE_ENV")) {
            Some(value) => parse("APP_ENV", &value)?,
            None => Environment::Development,
        };

        let secret_key = match get("SECRET_KEY") {
            Some(secret) => secret,
            None if environment == Environment::Production => {
                return Err(ConfigError::Missing("SECRET_KEY"))
            }
            None => DEVELOPMENT_SECRET.to_string(),
        };

        let port = get("PORT")
            .map(|value| parse("PORT", &value))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        let database_max_connections = get("DATABASE_MAX_CONNECTIONS")
            .map(|value| parse("DATABASE_MAX_CONNECTIONS", &value))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let session_expiration_days = match get("SESSION_EXPIRATION_DAYS") {
            Some(value) => {
                let days: i64 = parse("SESSION_EXPIRATION_DAYS", &value)?;
                if !SESSION_EXPIRATION_RANGE.contains(&days) {
                    return Err(ConfigError::Invalid {
                        key: "SESSION_EXPIRATION_DAYS",
                        value,
                    });
                }
                days
            }
            None => DEFAULT_SESSION_EXPIRATION_DAYS,
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            port,
            database_url: get("DATABASE_URL"),
            database_max_connections,
            secret_key,
            session_expiration_days,
            environment,
            cors_allowed_origins,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            secret_key: DEVELOPMENT_SECRET.to_string(),
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
            environment: Environment::Development,
            cors_allowed_origins: Vec::new(),
        }
    }
}

fn parse<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
