//! Query execution and result normalization
//!
//! The [`QueryExecutor`] trait is the seam between tool handlers and the
//! database. [`PostgresExecutor`] is the live implementation on top of
//! `tokio-postgres`; tests substitute stubs that record calls.

use async_trait::async_trait;
use serde::Serialize;
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::{Column, NoTls, Row};

use crate::config::PgConfig;

// ============================================================================
// Result Envelope
// ============================================================================

/// Normalized result of one query
///
/// Rows are JSON objects keyed by column name; `fields` carries the column
/// metadata of the prepared statement, so it is exact even for zero-row
/// results. Serialized field names match the wire format clients already
/// parse (`rowCount`, `dataTypeID`, `dataTypeSize`).
#[derive(Debug, Serialize)]
pub struct QueryReply {
    /// Result rows as JSON objects keyed by column name
    pub rows: Vec<serde_json::Value>,
    /// Number of rows returned
    #[serde(rename = "rowCount")]
    pub row_count: usize,
    /// Column metadata, when the executor provides it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldMeta>>,
}

/// Metadata for one projected column
#[derive(Debug, Serialize)]
pub struct FieldMeta {
    /// Column name
    pub name: String,
    /// PostgreSQL type OID
    #[serde(rename = "dataTypeID")]
    pub type_id: u32,
    /// Fixed wire size in bytes, -1 for variable-length types
    #[serde(rename = "dataTypeSize")]
    pub type_size: i16,
}

/// Error from query preparation or execution
///
/// Carries the server's message for database errors and the driver message
/// otherwise; tool surfaces relay the text as-is.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct ExecutorError(pub String);

impl From<tokio_postgres::Error> for ExecutorError {
    fn from(e: tokio_postgres::Error) -> Self {
        match e.as_db_error() {
            Some(db) => ExecutorError(db.message().to_string()),
            None => ExecutorError(e.to_string()),
        }
    }
}

// ============================================================================
// Executor
// ============================================================================

/// Executes SQL and normalizes the result into a [`QueryReply`]
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Run one statement with positional text parameters (`$1`, `$2`, ...)
    async fn execute(&self, sql: &str, params: &[String]) -> Result<QueryReply, ExecutorError>;
}

/// Live executor backed by a single shared `tokio_postgres` client
///
/// The connection is opened once at startup; the driver task is spawned onto
/// the runtime and logs if the link drops. Concurrent callers share the
/// client, which pipelines requests internally.
pub struct PostgresExecutor {
    client: tokio_postgres::Client,
}

impl PostgresExecutor {
    /// Connect using the assembled configuration
    pub async fn connect(config: &PgConfig) -> Result<Self, tokio_postgres::Error> {
        let (client, connection) = config.connect_config().connect(NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {}", e);
            }
        });

        tracing::info!("Connected to PostgreSQL database");
        Ok(Self { client })
    }
}

#[async_trait]
impl QueryExecutor for PostgresExecutor {
    async fn execute(&self, sql: &str, params: &[String]) -> Result<QueryReply, ExecutorError> {
        // Preparing first makes column metadata available even when the
        // query returns no rows.
        let stmt = self.client.prepare(sql).await?;

        let args: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect();
        let rows = self.client.query(&stmt, &args).await?;

        let fields = stmt
            .columns()
            .iter()
            .map(|c| FieldMeta {
                name: c.name().to_string(),
                type_id: c.type_().oid(),
                type_size: type_size(c.type_()),
            })
            .collect();

        Ok(QueryReply {
            row_count: rows.len(),
            rows: rows.iter().map(row_to_json).collect(),
            fields: Some(fields),
        })
    }
}

// ============================================================================
// Row Conversion
// ============================================================================

/// Convert a row into a JSON object keyed by column name
pub fn row_to_json(row: &Row) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (idx, column) in row.columns().iter().enumerate() {
        map.insert(column.name().to_string(), cell_to_json(row, idx, column));
    }
    serde_json::Value::Object(map)
}

/// Decode one cell by type name
///
/// NULLs become JSON null. Temporal and uuid values render as strings,
/// bytea as a length placeholder. Types without a mapping fall back to a
/// string read, then to a `<typename>` placeholder.
fn cell_to_json(row: &Row, idx: usize, column: &Column) -> serde_json::Value {
    match column.type_().name() {
        "bool" => opt_json(row.try_get::<_, Option<bool>>(idx)),
        "char" => opt_json(row.try_get::<_, Option<i8>>(idx)),
        "int2" => opt_json(row.try_get::<_, Option<i16>>(idx)),
        "int4" => opt_json(row.try_get::<_, Option<i32>>(idx)),
        "int8" => opt_json(row.try_get::<_, Option<i64>>(idx)),
        "oid" => opt_json(row.try_get::<_, Option<u32>>(idx)),
        "float4" => opt_json(row.try_get::<_, Option<f32>>(idx)),
        "float8" => opt_json(row.try_get::<_, Option<f64>>(idx)),
        "text" | "varchar" | "name" | "bpchar" => {
            opt_json(row.try_get::<_, Option<String>>(idx))
        }
        "json" | "jsonb" => opt_json(row.try_get::<_, Option<serde_json::Value>>(idx)),
        "uuid" => opt_json(
            row.try_get::<_, Option<uuid::Uuid>>(idx)
                .map(|v| v.map(|u| u.to_string())),
        ),
        "timestamp" => opt_json(
            row.try_get::<_, Option<chrono::NaiveDateTime>>(idx)
                .map(|v| v.map(|t| t.to_string())),
        ),
        "timestamptz" => opt_json(
            row.try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)
                .map(|v| v.map(|t| t.to_rfc3339())),
        ),
        "date" => opt_json(
            row.try_get::<_, Option<chrono::NaiveDate>>(idx)
                .map(|v| v.map(|d| d.to_string())),
        ),
        "time" => opt_json(
            row.try_get::<_, Option<chrono::NaiveTime>>(idx)
                .map(|v| v.map(|t| t.to_string())),
        ),
        "bytea" => match row.try_get::<_, Option<Vec<u8>>>(idx) {
            Ok(Some(bytes)) => serde_json::Value::String(format!("<bytea {} bytes>", bytes.len())),
            _ => serde_json::Value::Null,
        },
        other => match row.try_get::<_, Option<String>>(idx) {
            Ok(v) => v.map(serde_json::Value::String).unwrap_or(serde_json::Value::Null),
            Err(_) => serde_json::Value::String(format!("<{}>", other)),
        },
    }
}

fn opt_json<T: Serialize>(value: Result<Option<T>, tokio_postgres::Error>) -> serde_json::Value {
    match value {
        Ok(Some(v)) => serde_json::json!(v),
        _ => serde_json::Value::Null,
    }
}

/// Fixed wire size of a type in bytes, -1 for variable-length
///
/// Mirrors `pg_type.typlen` for the types the converter understands.
fn type_size(ty: &Type) -> i16 {
    match ty.name() {
        "bool" | "char" => 1,
        "int2" => 2,
        "int4" | "oid" | "float4" | "date" => 4,
        "int8" | "float8" | "time" | "timestamp" | "timestamptz" => 8,
        "interval" => 16,
        "uuid" => 16,
        "name" => 64,
        _ => -1,
    }
}
