//! Data types for the Market Stream MCP Server
//!
//! This module contains the core market data structures used throughout the application.

mod market;

pub use market::{
    DividendPayment, EarningsEvent, HistoryPeriod, OptionContract, OptionSide, PriceBar,
    PriceHistory, Quote,
};

/// Result type for MCP operations
pub type McpResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;
