//! Configuration management.
//!
//! Configuration is loaded from environment variables (and a `.env` file when
//! present) with sensible defaults. Malformed values are rejected at startup
//! instead of being silently replaced by defaults.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Paging and expansion limits.
    pub paging: PagingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to (0 picks an ephemeral port).
    pub port: u16,
    /// Absolute origin used in generated links.
    pub base_url: String,
    /// Path prefix every resource route is mounted under (empty or `/...`).
    pub base_path: String,
    /// CORS allowed origins.
    pub cors_origins: Vec<String>,
}

/// Which storage engine backs the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// Postgres through sqlx.
    Postgres,
    /// Process memory; data is lost on restart.
    Memory,
}

impl FromStr for StorageMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(Error::config(format!(
                "ROSTER_STORAGE must be 'postgres' or 'memory', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        })
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Selected engine.
    pub mode: StorageMode,
    /// Database connection URL (required for Postgres).
    pub database_url: Option<String>,
    /// Minimum pool connections.
    pub min_connections: u32,
    /// Maximum pool connections.
    pub max_connections: u32,
    /// How long a request may wait for a pooled connection.
    pub acquire_timeout: Duration,
    /// Per-statement timeout enforced by the database.
    pub statement_timeout: Duration,
    /// Apply the bundled migration at startup.
    pub run_migrations: bool,
}

/// Paging and relation expansion limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    /// Page size used when the request has none.
    pub default_size: u32,
    /// Largest page size a client may request.
    pub max_size: u32,
    /// Related entities rendered per expanded relation.
    pub expansion_limit: u32,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_size: 20,
            max_size: 100,
            expansion_limit: 50,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// ## Errors
    ///
    /// Returns `Error::Config` if a value cannot be parsed, or if Postgres
    /// storage is selected without `DATABASE_URL`.
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// ## Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("ROSTER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse(&var, "ROSTER_PORT", 8080u16)?;
        let base_url = var("ROSTER_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();
        let base_path = normalize_base_path(var("ROSTER_BASE_PATH").as_deref())?;
        let cors_origins = var("ROSTER_CORS_ORIGINS")
            .map(|s| s.split(',').map(str::trim).map(String::from).collect())
            .unwrap_or_else(|| vec!["*".to_string()]);

        let mode = var("ROSTER_STORAGE")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(StorageMode::Postgres);
        let database_url = var("DATABASE_URL");
        if mode == StorageMode::Postgres && database_url.is_none() {
            return Err(Error::config(
                "DATABASE_URL environment variable is required for postgres storage",
            ));
        }
        let min_connections = parse(&var, "ROSTER_DB_MIN_CONNECTIONS", 1u32)?;
        let max_connections = parse(&var, "ROSTER_DB_MAX_CONNECTIONS", 10u32)?;
        if min_connections > max_connections {
            return Err(Error::config(
                "ROSTER_DB_MIN_CONNECTIONS exceeds ROSTER_DB_MAX_CONNECTIONS",
            ));
        }
        let acquire_timeout =
            Duration::from_secs(parse(&var, "ROSTER_DB_ACQUIRE_TIMEOUT_SECS", 5u64)?);
        let statement_timeout =
            Duration::from_millis(parse(&var, "ROSTER_DB_STATEMENT_TIMEOUT_MS", 5000u64)?);
        let run_migrations = var("ROSTER_RUN_MIGRATIONS")
            .map(|v| parse_bool("ROSTER_RUN_MIGRATIONS", &v))
            .transpose()?
            .unwrap_or(true);

        let paging = PagingConfig {
            default_size: parse(&var, "ROSTER_DEFAULT_PAGE_SIZE", 20u32)?,
            max_size: parse(&var, "ROSTER_MAX_PAGE_SIZE", 100u32)?,
            expansion_limit: parse(&var, "ROSTER_RELATION_EXPANSION_LIMIT", 50u32)?,
        };
        if paging.default_size == 0 || paging.max_size == 0 || paging.expansion_limit == 0 {
            return Err(Error::config("page sizes and expansion limit must be positive"));
        }
        if paging.default_size > paging.max_size {
            return Err(Error::config(
                "ROSTER_DEFAULT_PAGE_SIZE exceeds ROSTER_MAX_PAGE_SIZE",
            ));
        }

        Ok(Self {
            server: ServerConfig {
                host,
                port,
                base_url,
                base_path,
                cors_origins,
            },
            storage: StorageConfig {
                mode,
                database_url,
                min_connections,
                max_connections,
                acquire_timeout,
                statement_timeout,
                run_migrations,
            },
            paging,
        })
    }

    /// Creates a memory-backed configuration for testing.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
                base_url: "http://localhost:8080".to_string(),
                base_path: String::new(),
                cors_origins: vec!["*".to_string()],
            },
            storage: StorageConfig {
                mode: StorageMode::Memory,
                database_url: None,
                min_connections: 1,
                max_connections: 5,
                acquire_timeout: Duration::from_secs(5),
                statement_timeout: Duration::from_secs(5),
                run_migrations: false,
            },
            paging: PagingConfig::default(),
        }
    }

    /// Returns the `host:port` bind address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse<T: FromStr>(var: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("{key} has an invalid value '{raw}'"))),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Error::config(format!("{key} must be a boolean, got '{raw}'"))),
    }
}

fn normalize_base_path(raw: Option<&str>) -> Result<String> {
    let Some(path) = raw.map(str::trim) else {
        return Ok(String::new());
    };
    if !path.starts_with('/') {
        return Err(Error::config(format!(
            "ROSTER_BASE_PATH must start with '/', got '{path}'"
        )));
    }
    Ok(path.trim_end_matches('/').to_string())
}
