//! Constructors for tool call results
//!
//! Tool methods build every response through these helpers so the content
//! shape stays uniform across servers: one text block, JSON for data, the
//! error flag set when a caught failure is being reported.

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;

use crate::error::internal_error;

/// Pretty-printed JSON result from any serializable value
///
/// Query envelopes and catalog listings go through here. Serialization
/// failure is a protocol error, not an in-band one; values assembled from
/// database rows do not fail to serialize.
pub fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data).map_err(|e| internal_error(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Plain text result
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Error-flagged text result
///
/// For failures reported in-band: the call succeeds at the protocol level,
/// the error flag is set, and the content carries the message. Rejected
/// queries and failed SQL statements use this, so the caller always gets
/// readable text back instead of a transport fault.
pub fn text_error(text: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(text.into())])
}
