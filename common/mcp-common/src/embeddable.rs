//! In-process tool dispatch
//!
//! [`EmbeddableMcp`] lets a server's tools be listed and called directly,
//! with no transport underneath. The HTTP session layer routes `tools/call`
//! through it, and unit tests drive servers this way against stub
//! executors.

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Failure of an in-process tool call
///
/// Only dispatch-level problems land here. A tool that runs and fails
/// reports that in-band through the returned [`CallToolResult`].
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    /// No tool with this name is registered
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// The arguments did not match the tool's parameter struct
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The tool surfaced a protocol-level error
    #[error("mcp error: {0}")]
    McpError(String),
}

impl From<rmcp::ErrorData> for EmbeddableError {
    fn from(err: rmcp::ErrorData) -> Self {
        EmbeddableError::McpError(err.message.to_string())
    }
}

/// Result type for in-process dispatch
pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// Deserialize the raw `arguments` object of a call into a typed parameter
/// struct
///
/// Missing or mistyped fields become [`EmbeddableError::InvalidParams`],
/// mirroring what the schema-checked transport path would reject.
pub fn parse_params<T: DeserializeOwned>(params: Value) -> EmbeddableResult<T> {
    serde_json::from_value(params).map_err(|e| EmbeddableError::InvalidParams(e.to_string()))
}

/// Servers whose tools can be listed and called without a transport
///
/// Implementations must be `Send + Sync`; sessions call tools from
/// concurrent tasks. The expected shape delegates listing to the server's
/// `ToolRouter` and dispatches on the tool name:
///
/// ```rust,ignore
/// #[async_trait]
/// impl EmbeddableMcp for PostgresMcpServer {
///     fn server_name(&self) -> &str {
///         "postgres-mcp"
///     }
///
///     fn list_tools(&self) -> Vec<Tool> {
///         self.tool_router.list_all()
///     }
///
///     async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
///         match name {
///             "query" => Ok(self.query(Parameters(parse_params(params)?)).await?),
///             _ => Err(EmbeddableError::ToolNotFound(name.to_string())),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Name the server identifies itself by
    fn server_name(&self) -> &str;

    /// Every tool the server offers, with input schemas
    fn list_tools(&self) -> Vec<Tool>;

    /// Call a tool by name with a JSON object of arguments
    ///
    /// Dispatch failures (unknown name, arguments that do not deserialize)
    /// come back as [`EmbeddableError`]; a tool that runs and fails reports
    /// the failure in-band through the returned result's error flag.
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;

    /// Short description of the server, if it has one
    fn server_description(&self) -> Option<&str> {
        None
    }

    /// Server version, if known
    fn server_version(&self) -> Option<&str> {
        None
    }
}
