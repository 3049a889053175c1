//! PostgreSQL MCP server over streamable HTTP
//!
//! Serves a single read-only `sql-select` tool on `POST /mcp`, with session
//! continuity through the `mcp-session-id` header, an event stream on
//! `GET /mcp`, and explicit session close on `DELETE /mcp`.

pub mod config;
pub mod jsonrpc;
pub mod server;
pub mod session;
pub mod web;

pub use config::HttpConfig;
pub use server::{SqlSelectParams, SqlSelectServer};
pub use session::{McpSession, SessionStore};
pub use web::{create_router, serve, AppState, MCP_SESSION_HEADER};
