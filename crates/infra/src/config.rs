//! Process configuration, read once from the environment at startup.
//!
//! `DB_HOST` decides the storage backend: set → PostgreSQL, unset or empty →
//! in-memory. The presence of `SCF_RUNTIME_API` marks the serverless runtime,
//! which forces debug off and bounds the database connect time.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_DB_NAME: &str = "userhub";
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_SECRET_KEY: &str = "userhub-insecure-dev-secret";
const DEFAULT_MAX_PAGE_SIZE: u32 = 1000;
const LOCAL_BIND_ADDR: &str = "0.0.0.0:8080";
const SERVERLESS_BIND_ADDR: &str = "0.0.0.0:9000";
const LOCAL_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const SERVERLESS_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            var,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// A value that must never end up in logs.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for Secret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Runtime the process believes it is running in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Environment {
    Local,
    Serverless,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Serverless => "serverless",
        }
    }
}

/// Connection parameters for the PostgreSQL store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: Secret,
    pub connect_timeout: Duration,
}

/// Everything the service reads from its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub environment: Environment,
    /// `None` selects the in-memory store.
    pub database: Option<DatabaseSettings>,
    pub secret_key: Secret,
    pub debug: bool,
    pub bind_addr: SocketAddr,
    pub max_page_size: u32,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let environment = if lookup("SCF_RUNTIME_API").is_some() {
            Environment::Serverless
        } else {
            Environment::Local
        };

        let debug = match environment {
            Environment::Serverless => false,
            Environment::Local => var("DEBUG").is_some_and(|v| v.eq_ignore_ascii_case("true")),
        };

        let database = match var("DB_HOST") {
            None => None,
            Some(host) => {
                let port = match var("DB_PORT") {
                    None => DEFAULT_DB_PORT,
                    Some(raw) => raw
                        .parse::<u16>()
                        .map_err(|e| ConfigError::invalid("DB_PORT", &raw, e))?,
                };
                Some(DatabaseSettings {
                    host,
                    port,
                    name: var("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
                    user: var("DB_USER").unwrap_or_else(|| DEFAULT_DB_USER.to_string()),
                    password: Secret::new(lookup("DB_PASSWORD").unwrap_or_default()),
                    connect_timeout: match environment {
                        Environment::Local => LOCAL_CONNECT_TIMEOUT,
                        Environment::Serverless => SERVERLESS_CONNECT_TIMEOUT,
                    },
                })
            }
        };

        let secret_key = Secret::new(var("SECRET_KEY").unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string()));

        let bind_raw = var("BIND_ADDR").unwrap_or_else(|| {
            match environment {
                Environment::Local => LOCAL_BIND_ADDR,
                Environment::Serverless => SERVERLESS_BIND_ADDR,
            }
            .to_string()
        });
        let bind_addr = bind_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", &bind_raw, e))?;

        let max_page_size = match var("MAX_PAGE_SIZE") {
            None => DEFAULT_MAX_PAGE_SIZE,
            Some(raw) => match raw.parse::<u32>() {
                Ok(0) => return Err(ConfigError::invalid("MAX_PAGE_SIZE", &raw, "must be positive")),
                Ok(n) => n,
                Err(e) => return Err(ConfigError::invalid("MAX_PAGE_SIZE", &raw, e)),
            },
        };

        Ok(Self {
            environment,
            database,
            secret_key,
            debug,
            bind_addr,
            max_page_size,
        })
    }

    /// Tracing filter used when `RUST_LOG` is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }

    /// True when `SECRET_KEY` was not provided.
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key.expose() == DEFAULT_SECRET_KEY
    }

    pub fn store_kind(&self) -> &'static str {
        if self.database.is_some() { "postgres" } else { "memory" }
    }
}

impl Default for Settings {
    /// Local, in-memory, ephemeral-port defaults (tests and dev).
    fn default() -> Self {
        Self {
            environment: Environment::Local,
            database: None,
            secret_key: Secret::new(DEFAULT_SECRET_KEY),
            debug: false,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}
