//! Server configuration from environment variables

use anyhow::{Context, Result};
use pg_common::PgConfig;

/// HTTP server settings: the database configuration plus the listen port
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub pg: PgConfig,
    /// Listen port, from `PORT` (default 8080)
    pub port: u16,
}

impl HttpConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pg = PgConfig::from_lookup(&get)?;
        let port = get("PORT")
            .map(|p| p.parse::<u16>().context("invalid PORT"))
            .transpose()?
            .unwrap_or(8080);
        Ok(Self { pg, port })
    }
}
