//! Protocol-level error helpers
//!
//! Only genuinely protocol-level failures go through these, such as a
//! result value that cannot be serialized. A tool that runs and fails
//! reports the failure in-band via [`crate::result::text_error`] instead.

use rmcp::ErrorData as McpError;

/// Result type for tool methods
pub type McpResult<T> = Result<T, McpError>;

/// Internal protocol error carrying a message
pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}
