//! Integration tests for the PostgreSQL MCP server
//!
//! These tests run against a real PostgreSQL server. They require:
//! - A reachable server described by the POSTGRES_* environment variables
//!
//! # Running tests
//!
//! ```bash
//! # Run against a local server
//! POSTGRES_URL=postgresql://postgres@localhost:5432/postgres \
//!     cargo test --test integration -- --ignored
//! ```

use mcp_common::EmbeddableMcp;
use pg_common::{PgConfig, PostgresExecutor};
use postgres_mcp::PostgresMcpServer;
use serde_json::{json, Value};
use std::sync::Arc;

/// Connect using POSTGRES_* variables, or skip when no server is reachable
async fn connect_server() -> Option<PostgresMcpServer> {
    let config = match PgConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Skipping: invalid POSTGRES_* configuration: {}", e);
            return None;
        }
    };

    match PostgresExecutor::connect(&config).await {
        Ok(executor) => Some(PostgresMcpServer::new(Arc::new(executor), config.read_only)),
        Err(e) => {
            eprintln!("Skipping: PostgreSQL not reachable: {}", e);
            None
        }
    }
}

fn result_text(result: &mcp_common::CallToolResult) -> String {
    let value = serde_json::to_value(result).unwrap();
    value["content"][0]["text"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "integration test - requires a live PostgreSQL server"]
async fn select_one_returns_full_envelope() {
    let Some(server) = connect_server().await else {
        return;
    };

    let result = server
        .call_tool("query", json!({"sql": "SELECT 1 AS one"}))
        .await
        .unwrap();
    let body: Value = serde_json::from_str(&result_text(&result)).unwrap();

    assert_eq!(body["rowCount"], 1);
    assert_eq!(body["rows"][0]["one"], 1);
    assert_eq!(body["fields"][0]["name"], "one");
}

#[tokio::test]
#[ignore = "integration test - requires a live PostgreSQL server"]
async fn empty_result_still_reports_columns() {
    let Some(server) = connect_server().await else {
        return;
    };

    let result = server
        .call_tool("query", json!({"sql": "SELECT 1 AS one WHERE false"}))
        .await
        .unwrap();
    let body: Value = serde_json::from_str(&result_text(&result)).unwrap();

    assert_eq!(body["rowCount"], 0);
    assert_eq!(body["fields"][0]["name"], "one");
}

#[tokio::test]
#[ignore = "integration test - requires a live PostgreSQL server"]
async fn list_schemas_excludes_system_schemas() {
    let Some(server) = connect_server().await else {
        return;
    };

    let result = server.call_tool("list_schemas", json!({})).await.unwrap();
    let schemas: Vec<Value> = serde_json::from_str(&result_text(&result)).unwrap();

    for record in &schemas {
        let name = record["schema_name"].as_str().unwrap();
        assert!(
            !matches!(name, "information_schema" | "pg_catalog" | "pg_toast"),
            "system schema leaked: {}",
            name
        );
    }
}

#[tokio::test]
#[ignore = "integration test - requires a live PostgreSQL server"]
async fn list_tables_excludes_system_schemas() {
    let Some(server) = connect_server().await else {
        return;
    };

    let result = server.call_tool("list_tables", json!({})).await.unwrap();
    let tables: Vec<Value> = serde_json::from_str(&result_text(&result)).unwrap();

    for record in &tables {
        let schema = record["schemaname"].as_str().unwrap();
        assert!(
            !matches!(schema, "information_schema" | "pg_catalog"),
            "system table leaked: {}",
            schema
        );
    }
}

#[tokio::test]
#[ignore = "integration test - requires a live PostgreSQL server"]
async fn describe_table_reports_columns_in_ordinal_order() {
    let Some(server) = connect_server().await else {
        return;
    };

    // Recreate the scratch table in case an earlier run died mid-test
    server
        .call_tool("query", json!({"sql": "DROP TABLE IF EXISTS mcp_describe_scratch"}))
        .await
        .unwrap();
    let created = server
        .call_tool(
            "query",
            json!({"sql": "CREATE TABLE mcp_describe_scratch (id int, name text)"}),
        )
        .await
        .unwrap();
    assert!(
        !created.is_error.unwrap_or(false),
        "scratch table not created: {}",
        result_text(&created)
    );

    let result = server
        .call_tool("describe_table", json!({"table_name": "mcp_describe_scratch"}))
        .await
        .unwrap();
    let columns: Vec<Value> = serde_json::from_str(&result_text(&result)).unwrap();

    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0]["column_name"], "id");
    assert_eq!(columns[0]["data_type"], "integer");
    assert_eq!(columns[1]["column_name"], "name");
    assert_eq!(columns[1]["data_type"], "text");

    server
        .call_tool("query", json!({"sql": "DROP TABLE mcp_describe_scratch"}))
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "integration test - requires a live PostgreSQL server"]
async fn missing_relation_error_is_surfaced() {
    let Some(server) = connect_server().await else {
        return;
    };

    let result = server
        .call_tool("query", json!({"sql": "SELECT * FROM table_that_does_not_exist_xyz"}))
        .await
        .unwrap();

    assert!(result.is_error.unwrap_or(false));
    let text = result_text(&result);
    assert!(text.starts_with("Error: "));
    assert!(text.contains("table_that_does_not_exist_xyz"));
}
