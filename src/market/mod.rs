//! Market data layer
//!
//! This module contains the provider abstraction, the Yahoo Finance
//! provider, a deterministic offline provider, and the analysis
//! routines shared by the tools.

pub mod analysis;
mod offline;
mod provider;
mod yahoo;

use std::sync::Arc;

pub use offline::OfflineProvider;
pub use provider::{MarketDataProvider, MarketError, MarketResult};
pub use yahoo::YahooProvider;

/// Build the provider selected by `MARKET_DATA_MODE`
///
/// "offline" serves deterministic synthetic data, anything else (or an
/// unset variable) uses Yahoo Finance.
pub fn provider_from_env() -> MarketResult<Arc<dyn MarketDataProvider>> {
    match std::env::var("MARKET_DATA_MODE").as_deref() {
        Ok("offline") => {
            tracing::info!("market data mode: offline");
            Ok(Arc::new(OfflineProvider::new()))
        }
        _ => Ok(Arc::new(YahooProvider::new()?)),
    }
}
