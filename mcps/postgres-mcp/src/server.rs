//! PostgreSQL MCP Server implementation

use mcp_common::{
    async_trait, json_success, parse_params, text_error, EmbeddableError, EmbeddableMcp,
    EmbeddableResult, McpResult,
};
use pg_common::{check_read_only, QueryExecutor};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, ServerCapabilities, ServerInfo, Tool},
    tool, tool_handler, tool_router,
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

// ============================================================================
// Parameter Types
// ============================================================================

/// Parameters for the query tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryParams {
    /// The SQL query to execute
    pub sql: String,
    /// Optional positional text parameters bound to $1, $2, ...
    #[serde(default)]
    pub params: Option<Vec<String>>,
}

/// Parameters for the describe_table tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DescribeTableParams {
    /// The name of the table to describe
    pub table_name: String,
}

// ============================================================================
// Server Implementation
// ============================================================================

/// PostgreSQL MCP Server
///
/// Five tools over one shared executor: a generic query tool plus fixed
/// catalog inspections. Failures are reported in-band as error-flagged
/// `Error: <message>` text blocks.
#[derive(Clone)]
pub struct PostgresMcpServer {
    executor: Arc<dyn QueryExecutor>,
    read_only: bool,
    tool_router: ToolRouter<Self>,
}

impl PostgresMcpServer {
    /// Create a new PostgreSQL MCP server
    ///
    /// With `read_only` set, the generic query tool only accepts SELECT
    /// statements; the catalog tools are unaffected.
    pub fn new(executor: Arc<dyn QueryExecutor>, read_only: bool) -> Self {
        Self {
            executor,
            read_only,
            tool_router: Self::tool_router(),
        }
    }

    /// Run a fixed catalog query and return its rows only
    async fn catalog(&self, sql: &str, params: &[String]) -> McpResult<CallToolResult> {
        match self.executor.execute(sql, params).await {
            Ok(reply) => json_success(&reply.rows),
            Err(e) => Ok(text_error(format!("Error: {}", e))),
        }
    }
}

#[tool_router]
impl PostgresMcpServer {
    /// Execute an arbitrary SQL statement and return the full result envelope
    #[tool(description = "Execute a SQL query on the PostgreSQL database")]
    async fn query(&self, Parameters(params): Parameters<QueryParams>) -> McpResult<CallToolResult> {
        if self.read_only {
            if let Err(e) = check_read_only(&params.sql) {
                return Ok(text_error(format!("Error: {}", e)));
            }
        }

        let bound = params.params.unwrap_or_default();
        match self.executor.execute(&params.sql, &bound).await {
            Ok(reply) => json_success(&reply),
            Err(e) => Ok(text_error(format!("Error: {}", e))),
        }
    }

    /// List user tables with owner and index/rule/trigger flags
    #[tool(description = "List all tables in the current database")]
    async fn list_tables(&self) -> McpResult<CallToolResult> {
        self.catalog(
            "SELECT schemaname, tablename, tableowner, hasindexes, hasrules, hastriggers
             FROM pg_tables
             WHERE schemaname NOT IN ('information_schema', 'pg_catalog')
             ORDER BY schemaname, tablename",
            &[],
        )
        .await
    }

    /// Describe the columns of one table in ordinal order
    #[tool(description = "Get detailed information about a specific table")]
    async fn describe_table(
        &self,
        Parameters(params): Parameters<DescribeTableParams>,
    ) -> McpResult<CallToolResult> {
        self.catalog(
            "SELECT column_name, data_type, is_nullable, column_default,
                    character_maximum_length, numeric_precision, numeric_scale
             FROM information_schema.columns
             WHERE table_name = $1
             ORDER BY ordinal_position",
            &[params.table_name],
        )
        .await
    }

    /// List non-template databases
    #[tool(description = "List all available databases")]
    async fn list_databases(&self) -> McpResult<CallToolResult> {
        self.catalog(
            "SELECT datname FROM pg_database
             WHERE datistemplate = false
             ORDER BY datname",
            &[],
        )
        .await
    }

    /// List user schemas
    #[tool(description = "List all schemas in the current database")]
    async fn list_schemas(&self) -> McpResult<CallToolResult> {
        self.catalog(
            "SELECT schema_name
             FROM information_schema.schemata
             WHERE schema_name NOT IN ('information_schema', 'pg_catalog', 'pg_toast')
             ORDER BY schema_name",
            &[],
        )
        .await
    }
}

// ============================================================================
// In-Process Dispatch
// ============================================================================

#[async_trait]
impl EmbeddableMcp for PostgresMcpServer {
    fn server_name(&self) -> &str {
        "postgres-mcp"
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        match name {
            "query" => Ok(self.query(Parameters(parse_params(params)?)).await?),
            "list_tables" => Ok(self.list_tables().await?),
            "describe_table" => {
                Ok(self.describe_table(Parameters(parse_params(params)?)).await?)
            }
            "list_databases" => Ok(self.list_databases().await?),
            "list_schemas" => Ok(self.list_schemas().await?),
            _ => Err(EmbeddableError::ToolNotFound(name.to_string())),
        }
    }

    fn server_description(&self) -> Option<&str> {
        Some("PostgreSQL database query and catalog inspection tools")
    }

    fn server_version(&self) -> Option<&str> {
        Some(env!("CARGO_PKG_VERSION"))
    }
}

#[tool_handler]
impl rmcp::ServerHandler for PostgresMcpServer {
    fn get_info(&self) -> ServerInfo {
        let mode = if self.read_only { "read-only" } else { "read-write" };
        ServerInfo {
            instructions: Some(format!(
                "PostgreSQL database MCP server in {} mode. \
                Use query to run SQL, list_tables and describe_table to inspect tables, \
                and list_databases / list_schemas to browse the catalog.",
                mode
            )),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
