//! PostgreSQL access layer shared by the MCP servers
//!
//! This crate holds everything database-facing that both the stdio and the
//! HTTP server reuse:
//!
//! - **Configuration**: [`PgConfig`] assembled from `POSTGRES_*` environment
//!   variables, with `POSTGRES_URL` as the base and individual variables as
//!   overrides
//! - **Read-only guard**: [`check_read_only`], the first-token SELECT check
//! - **Execution**: the [`QueryExecutor`] trait, its live
//!   [`PostgresExecutor`] implementation, and the [`QueryReply`] envelope
//!   (rows as JSON objects, row count, column metadata)
//!
//! The trait seam exists so servers can be driven by a stub executor in
//! tests without a running database.

pub mod config;
pub mod executor;
pub mod guard;

pub use config::PgConfig;
pub use executor::{ExecutorError, FieldMeta, PostgresExecutor, QueryExecutor, QueryReply};
pub use guard::{check_read_only, RejectedQuery};
