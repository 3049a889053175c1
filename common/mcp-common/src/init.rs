//! Startup plumbing shared by the servers
//!
//! Tracing setup, the shared shutdown signal, and the `serve_stdio!` macro
//! that expands into a complete stdio `main`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up tracing for an MCP server process
///
/// Logs go to stderr; stdout belongs to the protocol. The given crate
/// defaults to `info`, everything else follows `RUST_LOG`. Output is plain
/// text without ANSI colors unless `LOG_FORMAT=json` asks for structured
/// lines.
///
/// ```rust,ignore
/// mcp_common::init_tracing("postgres_mcp")?;
/// ```
pub fn init_tracing(crate_name: &str) -> anyhow::Result<()> {
    let directive = format!("{}=info", crate_name);
    let filter = EnvFilter::from_default_env().add_directive(directive.parse()?);

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .init();
    }

    Ok(())
}

/// Resolves when the process receives SIGINT or, on Unix, SIGTERM
///
/// Both the stdio serve loop and the HTTP server's graceful shutdown wait
/// on this. Installing the handlers can only fail if the process is out of
/// resources, which is not recoverable at startup.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Expand into a stdio MCP server's `main`
///
/// The generated `#[tokio::main] async fn main()` initializes tracing,
/// evaluates the server expression, serves it over stdio, and runs until
/// the client disconnects or a shutdown signal arrives. The expression is
/// evaluated inside the async body, so it may `.await` and `?`; a
/// construction failure exits non-zero before the transport starts.
///
/// ```rust,ignore
/// mcp_common::serve_stdio!(
///     {
///         let config = PgConfig::from_env()?;
///         let executor = PostgresExecutor::connect(&config).await?;
///         PostgresMcpServer::new(Arc::new(executor), config.read_only)
///     },
///     "postgres_mcp"
/// );
/// ```
#[macro_export]
macro_rules! serve_stdio {
    ($server:expr, $crate_name:expr) => {
        #[tokio::main]
        async fn main() -> anyhow::Result<()> {
            use rmcp::ServiceExt;

            $crate::init_tracing($crate_name)?;

            tracing::info!("Starting {} MCP Server", $crate_name);

            let server = $server;
            let service = server.serve(rmcp::transport::stdio()).await?;

            tracing::info!("Server running, waiting for requests...");

            tokio::select! {
                result = service.waiting() => {
                    result?;
                }
                _ = $crate::shutdown_signal() => {
                    tracing::info!("Shutdown signal received");
                }
            }

            tracing::info!("Server shutting down");
            Ok(())
        }
    };
}
