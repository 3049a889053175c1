//! PostgreSQL MCP Server over streamable HTTP
//!
//! Exposes the sql-select tool on /mcp. Connection settings come from the
//! POSTGRES_* environment variables; PORT selects the listen port.

use anyhow::Result;
use postgres_http_mcp::{web, HttpConfig};

#[tokio::main]
async fn main() -> Result<()> {
    mcp_common::init_tracing("postgres_http_mcp")?;

    let config = HttpConfig::from_env()?;
    web::serve(config).await
}
