//! Market data provider abstraction
//!
//! Tools talk to a [`MarketDataProvider`] instead of a concrete data
//! source, so the HTTP-backed provider can be swapped for the offline
//! one in tests and demos.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::{
    DividendPayment, EarningsEvent, HistoryPeriod, OptionContract, OptionSide, PriceHistory,
    Quote,
};

/// Result type for provider calls
pub type MarketResult<T> = Result<T, MarketError>;

/// Errors surfaced by market data providers
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("no {period} data for {symbol}")]
    NoData { symbol: String, period: String },
    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("unexpected upstream payload: {0}")]
    Malformed(String),
}

/// Source of quotes, price history, options and corporate events
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Current quote for one symbol
    async fn quote(&self, symbol: &str) -> MarketResult<Quote>;

    /// Daily bars covering the given lookback period
    async fn history(&self, symbol: &str, period: HistoryPeriod) -> MarketResult<PriceHistory>;

    /// Expiration dates with listed options
    async fn options_expirations(&self, symbol: &str) -> MarketResult<Vec<NaiveDate>>;

    /// Option contracts for one side and expiration, sorted by strike
    async fn options_chain(
        &self,
        symbol: &str,
        side: OptionSide,
        expiration: NaiveDate,
    ) -> MarketResult<Vec<OptionContract>>;

    /// Dividend payments over the trailing `years_back` years
    async fn dividends(&self, symbol: &str, years_back: u32) -> MarketResult<Vec<DividendPayment>>;

    /// Upcoming earnings dates with consensus estimates
    async fn earnings(&self, symbol: &str) -> MarketResult<Vec<EarningsEvent>>;
}
