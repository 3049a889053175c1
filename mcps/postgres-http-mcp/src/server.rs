//! Single-tool MCP server bound to HTTP sessions

use mcp_common::{
    async_trait, internal_error, parse_params, text_error, text_success, EmbeddableError,
    EmbeddableMcp, EmbeddableResult, McpResult,
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

/// Parameters for the sql-select tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SqlSelectParams {
    /// The SELECT statement to run
    pub query: String,
}

/// MCP server exposing one read-only query tool
///
/// Every statement passes the SELECT check before it reaches the database.
/// Accepted queries return their rows as a JSON array; rejections and
/// execution failures come back as error-flagged text.
#[derive(Clone)]
pub struct SqlSelectServer {
    executor: Arc<dyn QueryExecutor>,
    tool_router: ToolRouter<Self>,
}

impl SqlSelectServer {
    pub fn new(executor: Arc<dyn QueryExecutor>) -> Self {
        Self {
            executor,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl SqlSelectServer {
    #[tool(
        name = "sql-select",
        description = "Select data from a PostgreSQL database"
    )]
    async fn sql_select(
        &self,
        Parameters(params): Parameters<SqlSelectParams>,
    ) -> McpResult<CallToolResult> {
        if let Err(e) = check_read_only(&params.query) {
            return Ok(text_error(e.to_string()));
        }

        match self.executor.execute(&params.query, &[]).await {
            Ok(reply) => {
                let rows =
                    serde_json::to_string(&reply.rows).map_err(|e| internal_error(e.to_string()))?;
                Ok(text_success(rows))
            }
            Err(e) => Ok(text_error(e.to_string())),
        }
    }
}

#[async_trait]
impl EmbeddableMcp for SqlSelectServer {
    fn server_name(&self) -> &str {
        "postgres-http-mcp"
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        match name {
            "sql-select" => Ok(self.sql_select(Parameters(parse_params(params)?)).await?),
            _ => Err(EmbeddableError::ToolNotFound(name.to_string())),
        }
    }

    fn server_description(&self) -> Option<&str> {
        Some("Read-only PostgreSQL query tool")
    }

    fn server_version(&self) -> Option<&str> {
        Some(env!("CARGO_PKG_VERSION"))
    }
}

#[tool_handler]
impl rmcp::ServerHandler for SqlSelectServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Read-only PostgreSQL MCP server. \
                Use sql-select to run SELECT statements; any other statement is rejected."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
