//! Process configuration, loaded once from the environment (and `.env`) at startup.

use crate::error::ConfigError;
use regex::Regex;
use std::str::FromStr;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/students";
const DEFAULT_SCHEMA: &str = "public";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Schema holding the `students` table. Must be a plain PostgreSQL identifier.
    pub database_schema: String,
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.into(),
            database_schema: DEFAULT_SCHEMA.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl Config {
    /// Read `HOST`, `PORT`, `DATABASE_URL`, `DATABASE_SCHEMA`, `DATABASE_MAX_CONNECTIONS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(v) => parse_number("PORT", &v)?,
            None => defaults.port,
        };
        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => {
                let n: u32 = parse_number("DATABASE_MAX_CONNECTIONS", &v)?;
                if n == 0 {
                    return Err(ConfigError::Invalid {
                        key: "DATABASE_MAX_CONNECTIONS",
                        value: v,
                        reason: "must be at least 1".into(),
                    });
                }
                n
            }
            None => defaults.max_connections,
        };
        let database_schema = get("DATABASE_SCHEMA").unwrap_or(defaults.database_schema);
        validate_identifier("DATABASE_SCHEMA", &database_schema)?;

        Ok(Config {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            database_url: get("DATABASE_URL").unwrap_or(defaults.database_url),
            database_schema,
            max_connections,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn validate_identifier(key: &'static str, value: &str) -> Result<(), ConfigError> {
    let re = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").map_err(|e| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if !re.is_match(value) {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be a plain identifier".into(),
        });
    }
    Ok(())
}
