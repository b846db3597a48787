//! Market Stream MCP Server - Binary Entry Point
//!
//! Runs either the Streamable HTTP transport (default) or the stdio
//! transport (`--stdio`).

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use market_stream::api::http::create_router;
use market_stream::api::sse::handler::AppState;
use market_stream::event_store::{self, EventStoreConfig};
use market_stream::market;
use market_stream::protocol::ServerInfo;
use market_stream::server::McpServer;
use market_stream::tools::build_registry;
use market_stream::types::McpResult;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> McpResult<()> {
    let stdio = std::env::args().any(|arg| arg == "--stdio");
    init_tracing(stdio);

    let server_info = ServerInfo::default();
    let provider = market::provider_from_env()?;

    if stdio {
        let tools = build_registry(provider);
        let mut server = McpServer::new(server_info, tools);
        info!(tools = server.tool_count(), "starting stdio transport");
        return server.run().await;
    }

    let store = event_store::open(&EventStoreConfig::from_env())?;
    let state = Arc::new(AppState::new(store, provider, server_info));
    let app = create_router(state);

    let bind_addr =
        std::env::var("MARKET_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "market-stream listening");

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let mut shutdown_tx = Some(shutdown_tx);
    ctrlc::set_handler(move || {
        if let Some(tx) = shutdown_tx.take() {
            let _ = tx.send(());
        }
    })?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}

fn init_tracing(stdio: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "market_stream=debug,tower_http=debug".into()),
    );

    if stdio {
        // JSON-RPC owns stdout, so logs go to stderr
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
