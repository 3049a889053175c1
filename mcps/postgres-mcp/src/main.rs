//! PostgreSQL MCP Server
//!
//! Exposes PostgreSQL query and catalog tools over stdio.
//! Connection settings come from the POSTGRES_* environment variables;
//! set POSTGRES_READ_ONLY=true to limit the query tool to SELECT statements.

mod server;

use anyhow::Context;
use pg_common::{PgConfig, PostgresExecutor};
use server::PostgresMcpServer;
use std::sync::Arc;

mcp_common::serve_stdio!(
    {
        let config = PgConfig::from_env()?;
        let executor = PostgresExecutor::connect(&config)
            .await
            .context("Failed to connect to PostgreSQL")?;
        PostgresMcpServer::new(Arc::new(executor), config.read_only)
    },
    "postgres_mcp"
);
