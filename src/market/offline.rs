//! Offline market data provider
//!
//! Serves deterministic synthetic data derived from the symbol name.
//! Used when `MARKET_DATA_MODE=offline` and throughout the test suite,
//! where hitting a real quote API would make tests flaky.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};

use crate::types::{
    DividendPayment, EarningsEvent, HistoryPeriod, OptionContract, OptionSide, PriceBar,
    PriceHistory, Quote,
};

use super::provider::{MarketDataProvider, MarketError, MarketResult};

/// Deterministic provider with no network access
#[derive(Default)]
pub struct OfflineProvider;

impl OfflineProvider {
    pub fn new() -> Self {
        Self
    }

    fn base_price(symbol: &str) -> f64 {
        let seed = fnv1a(symbol);
        20.0 + (seed % 480) as f64
    }

    fn phase(symbol: &str) -> f64 {
        // Spread symbols over a full oscillation cycle
        (fnv1a(symbol) % 628) as f64 / 100.0
    }

    /// Synthetic close for day `i` of a series: a slow upward drift
    /// plus an oscillation whose phase depends on the symbol
    fn close_at(symbol: &str, day: usize) -> f64 {
        let base = Self::base_price(symbol);
        base * (1.0 + 0.08 * ((day as f64 * 0.35) + Self::phase(symbol)).sin() + 0.001 * day as f64)
    }

    fn validate(symbol: &str) -> MarketResult<()> {
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-') {
            return Err(MarketError::UnknownSymbol(symbol.to_string()));
        }
        Ok(())
    }
}

fn fnv1a(input: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in input.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

#[async_trait]
impl MarketDataProvider for OfflineProvider {
    async fn quote(&self, symbol: &str) -> MarketResult<Quote> {
        Self::validate(symbol)?;
        let price = Self::close_at(symbol, 252);
        Ok(Quote {
            symbol: symbol.to_uppercase(),
            price,
            market_cap: Some((price * 1.0e7) as u64),
            volume: Some(1_000_000 + fnv1a(symbol) % 500_000),
        })
    }

    async fn history(&self, symbol: &str, period: HistoryPeriod) -> MarketResult<PriceHistory> {
        Self::validate(symbol)?;
        let days = period.trading_days();
        let today = Utc::now().date_naive();

        let mut bars = Vec::with_capacity(days);
        for i in 0..days {
            let close = Self::close_at(symbol, i);
            let open = if i == 0 {
                close * 0.998
            } else {
                Self::close_at(symbol, i - 1)
            };
            bars.push(PriceBar {
                date: today - Duration::days((days - 1 - i) as i64),
                open,
                high: open.max(close) * 1.002,
                low: open.min(close) * 0.998,
                close,
                volume: 1_000_000 + (i as u64 * 7_919) % 500_000,
            });
        }

        Ok(PriceHistory {
            symbol: symbol.to_uppercase(),
            period,
            bars,
        })
    }

    async fn options_expirations(&self, symbol: &str) -> MarketResult<Vec<NaiveDate>> {
        Self::validate(symbol)?;
        let today = Utc::now().date_naive();
        Ok((1..=4).map(|weeks| today + Duration::weeks(weeks)).collect())
    }

    async fn options_chain(
        &self,
        symbol: &str,
        side: OptionSide,
        expiration: NaiveDate,
    ) -> MarketResult<Vec<OptionContract>> {
        Self::validate(symbol)?;
        let price = Self::close_at(symbol, 252);
        let step = (price * 0.025).max(0.5);
        let days_out = (expiration - Utc::now().date_naive()).num_days().max(1) as f64;

        let mut chain = Vec::with_capacity(11);
        for offset in -5i32..=5 {
            let strike = price + f64::from(offset) * step;
            let intrinsic = match side {
                OptionSide::Call => (price - strike).max(0.0),
                OptionSide::Put => (strike - price).max(0.0),
            };
            let time_value = 0.02 * price * (days_out / 30.0).sqrt();
            let last_price = intrinsic + time_value;
            chain.push(OptionContract {
                strike,
                last_price,
                bid: last_price * 0.98,
                ask: last_price * 1.02,
                volume: 100 + offset.unsigned_abs() as u64 * 37,
                open_interest: 500 + offset.unsigned_abs() as u64 * 91,
                implied_volatility: 0.25 + f64::from(offset.unsigned_abs()) * 0.01,
            });
        }
        Ok(chain)
    }

    async fn dividends(&self, symbol: &str, years_back: u32) -> MarketResult<Vec<DividendPayment>> {
        Self::validate(symbol)?;
        let today = Utc::now().date_naive();
        let quarters = years_back * 4;
        let amount = (Self::base_price(symbol) * 0.005 * 100.0).round() / 100.0;

        let mut payments: Vec<DividendPayment> = (0..quarters)
            .map(|q| DividendPayment {
                date: today - Duration::days(91 * i64::from(q) + 30),
                amount,
            })
            .collect();
        payments.reverse();
        Ok(payments)
    }

    async fn earnings(&self, symbol: &str) -> MarketResult<Vec<EarningsEvent>> {
        Self::validate(symbol)?;
        let today = Utc::now().date_naive();
        let eps = Self::base_price(symbol) / 30.0;
        Ok((0..4)
            .map(|q| EarningsEvent {
                date: today + Duration::days(30 + 91 * q),
                eps_estimate: Some((eps * 100.0).round() / 100.0),
                eps_actual: None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_history_is_deterministic() {
        let provider = OfflineProvider::new();
        let first = provider.history("AAPL", HistoryPeriod::Year).await.unwrap();
        let second = provider.history("AAPL", HistoryPeriod::Year).await.unwrap();
        assert_eq!(first.closes(), second.closes());
        assert_eq!(first.bars.len(), 252);
    }

    #[tokio::test]
    async fn test_different_symbols_differ() {
        let provider = OfflineProvider::new();
        let aapl = provider.history("AAPL", HistoryPeriod::Month).await.unwrap();
        let msft = provider.history("MSFT", HistoryPeriod::Month).await.unwrap();
        assert_ne!(aapl.closes(), msft.closes());
    }

    #[tokio::test]
    async fn test_prices_are_positive() {
        let provider = OfflineProvider::new();
        let history = provider.history("TSLA", HistoryPeriod::FiveYears).await.unwrap();
        assert!(history.bars.iter().all(|bar| bar.low > 0.0));
        assert!(history.bars.iter().all(|bar| bar.high >= bar.low));
    }

    #[tokio::test]
    async fn test_chain_brackets_spot_price() {
        let provider = OfflineProvider::new();
        let quote = provider.quote("AAPL").await.unwrap();
        let expiration = Utc::now().date_naive() + Duration::weeks(2);
        let chain = provider
            .options_chain("AAPL", OptionSide::Call, expiration)
            .await
            .unwrap();

        assert_eq!(chain.len(), 11);
        assert!(chain.first().unwrap().strike < quote.price);
        assert!(chain.last().unwrap().strike > quote.price);
    }

    #[tokio::test]
    async fn test_invalid_symbol_rejected() {
        let provider = OfflineProvider::new();
        let result = provider.quote("not a symbol!").await;
        assert!(matches!(result, Err(MarketError::UnknownSymbol(_))));
    }

    #[tokio::test]
    async fn test_dividends_cover_requested_years() {
        let provider = OfflineProvider::new();
        let payments = provider.dividends("KO", 3).await.unwrap();
        assert_eq!(payments.len(), 12);
        assert!(payments.windows(2).all(|w| w[0].date < w[1].date));
    }
}
