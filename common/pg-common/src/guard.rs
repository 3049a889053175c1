//! Read-only statement guard

/// Error returned when a statement fails the read-only check
///
/// The display text is the exact message relayed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Must be a SQL Select")]
pub struct RejectedQuery;

/// Accept a statement only when its first token reads as a SELECT
///
/// Takes the first whitespace-delimited token, lower-cases it, and accepts
/// iff it begins with `select`. This is a heuristic, not a parser: a SELECT
/// behind a leading comment or a CTE starting with `WITH` is rejected, and
/// a token like `selectx` passes here only to fail in the database. Callers
/// treat rejection as validation, before any SQL reaches the backend.
pub fn check_read_only(query: &str) -> Result<(), RejectedQuery> {
    let first = query.split_whitespace().next().unwrap_or("");
    if first.to_ascii_lowercase().starts_with("select") {
        Ok(())
    } else {
        Err(RejectedQuery)
    }
}
