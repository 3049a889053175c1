//! PostgreSQL MCP Library
//!
//! Query and catalog inspection tools for PostgreSQL databases.
//! The generic query tool is unrestricted by default; read-only mode
//! restricts it to SELECT statements.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use pg_common::{PgConfig, PostgresExecutor};
//! use postgres_mcp::PostgresMcpServer;
//! use std::sync::Arc;
//!
//! let config = PgConfig::from_env()?;
//! let executor = Arc::new(PostgresExecutor::connect(&config).await?);
//! let server = PostgresMcpServer::new(executor, config.read_only);
//! // Drive in-process via EmbeddableMcp or serve via stdio
//! ```

pub mod server;

// Re-export main server type
pub use server::PostgresMcpServer;

// Re-export parameter types for direct API usage
pub use server::{DescribeTableParams, QueryParams};
