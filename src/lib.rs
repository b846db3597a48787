//! Market Stream MCP Server
//!
//! A market data server implementing the Model Context Protocol (MCP)
//! with resumable streaming over the Streamable HTTP transport.
//!
//! # Features
//!
//! - **10 MCP Tools**: Quotes, history, options, dividends, earnings,
//!   volatility, indicators, correlations, and risk metrics
//! - **Resumable Streams**: Clients reconnect with `Last-Event-ID` and
//!   replay every missed message
//! - **Three Event Stores**: In-memory ring buffers, a durable LMDB
//!   store that survives restarts, and a TTL cache for short sessions
//! - **Dual Transport**: stdio for local clients, Streamable HTTP for
//!   remote ones
//!
//! # Modules
//!
//! - `types`: Core data structures (Quote, PriceHistory, OptionContract)
//! - `protocol`: MCP and JSON-RPC protocol types
//! - `event_store`: Pluggable stores backing stream resumability
//! - `market`: Market data providers and quantitative analysis
//! - `tools`: 10 MCP tool implementations
//! - `server`: MCP server over stdio
//! - `api`: Streamable HTTP transport with resumable SSE
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use market_stream::market::OfflineProvider;
//! use market_stream::tools::build_registry;
//! use market_stream::{McpServer, ServerInfo};
//!
//! #[tokio::main]
//! async fn main() {
//!     let provider = Arc::new(OfflineProvider::default());
//!     let tools = build_registry(provider);
//!     let mut server = McpServer::new(ServerInfo::default(), tools);
//!     server.run().await.unwrap();
//! }
//! ```

pub mod api;
pub mod event_store;
pub mod market;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod types;

// Re-export commonly used items at crate root
pub use event_store::{BackendKind, EventStore, EventStoreConfig};
pub use protocol::{McpTool, ServerInfo, Tool};
pub use server::McpServer;
pub use types::{
    DividendPayment, EarningsEvent, HistoryPeriod, McpResult, OptionContract, OptionSide,
    PriceBar, PriceHistory, Quote,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
