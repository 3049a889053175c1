//! Shared plumbing for the PostgreSQL MCP servers
//!
//! Both the stdio and HTTP servers build on this crate:
//!
//! - [`init`]: tracing setup, the shutdown signal, and the `serve_stdio!`
//!   macro that expands into a complete stdio `main`
//! - [`result`]: constructors for the text and JSON payloads of a
//!   `CallToolResult`
//! - [`error`]: protocol-level error helpers
//! - [`embeddable`]: the [`EmbeddableMcp`] trait for calling tools
//!   in-process, which is how the HTTP session layer routes `tools/call`
//!
//! A stdio server's whole `main.rs` is one macro invocation:
//!
//! ```rust,ignore
//! mcp_common::serve_stdio!(
//!     {
//!         let config = PgConfig::from_env()?;
//!         let executor = PostgresExecutor::connect(&config).await?;
//!         PostgresMcpServer::new(Arc::new(executor), config.read_only)
//!     },
//!     "postgres_mcp"
//! );
//! ```

pub mod embeddable;
pub mod error;
pub mod init;
pub mod result;

pub use embeddable::{parse_params, EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use error::{internal_error, McpResult};
pub use init::{init_tracing, shutdown_signal};
pub use result::{json_success, text_error, text_success};

// rmcp types every server touches
pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

// for EmbeddableMcp implementations
pub use async_trait::async_trait;
