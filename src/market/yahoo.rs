//! Yahoo Finance market data provider
//!
//! Talks to the public `query1.finance.yahoo.com` endpoints: chart for
//! history and dividends, quoteSummary for quotes and earnings, and the
//! options endpoint for chains. Response parsing lives in free
//! functions so it can be tested against canned payloads.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::types::{
    DividendPayment, EarningsEvent, HistoryPeriod, OptionContract, OptionSide, PriceBar,
    PriceHistory, Quote,
};

use super::provider::{MarketDataProvider, MarketError, MarketResult};

const QUERY_BASE: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; market-stream/0.1)";

/// Provider backed by the public Yahoo Finance API
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> MarketResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: QUERY_BASE.to_string(),
        })
    }

    async fn get_json(&self, url: String) -> MarketResult<Value> {
        debug!(url = %url, "fetching market data");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    async fn quote(&self, symbol: &str) -> MarketResult<Quote> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules=price",
            self.base_url, symbol
        );
        let body = self.get_json(url).await?;
        parse_quote(symbol, &body)
    }

    async fn history(&self, symbol: &str, period: HistoryPeriod) -> MarketResult<PriceHistory> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url,
            symbol,
            period.as_str()
        );
        let body = self.get_json(url).await?;
        parse_history(symbol, period, &body)
    }

    async fn options_expirations(&self, symbol: &str) -> MarketResult<Vec<NaiveDate>> {
        let url = format!("{}/v7/finance/options/{}", self.base_url, symbol);
        let body = self.get_json(url).await?;
        parse_expirations(symbol, &body)
    }

    async fn options_chain(
        &self,
        symbol: &str,
        side: OptionSide,
        expiration: NaiveDate,
    ) -> MarketResult<Vec<OptionContract>> {
        let timestamp = expiration.and_time(NaiveTime::MIN).and_utc().timestamp();
        let url = format!(
            "{}/v7/finance/options/{}?date={}",
            self.base_url, symbol, timestamp
        );
        let body = self.get_json(url).await?;
        parse_chain(symbol, side, &body)
    }

    async fn dividends(&self, symbol: &str, years_back: u32) -> MarketResult<Vec<DividendPayment>> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1mo&events=div",
            self.base_url,
            symbol,
            covering_range(years_back)
        );
        let body = self.get_json(url).await?;
        let cutoff = Utc::now().date_naive() - chrono::Duration::days(i64::from(years_back) * 365);
        parse_dividends(symbol, &body, cutoff)
    }

    async fn earnings(&self, symbol: &str) -> MarketResult<Vec<EarningsEvent>> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}?modules=calendarEvents",
            self.base_url, symbol
        );
        let body = self.get_json(url).await?;
        parse_earnings(symbol, &body)
    }
}

/// Smallest chart range covering a dividend lookback
fn covering_range(years_back: u32) -> &'static str {
    match years_back {
        0..=1 => "1y",
        2 => "2y",
        3..=5 => "5y",
        6..=10 => "10y",
        _ => "max",
    }
}

fn result_node<'a>(body: &'a Value, pointer: &str, symbol: &str) -> MarketResult<&'a Value> {
    body.pointer(pointer)
        .filter(|node| !node.is_null())
        .ok_or_else(|| MarketError::UnknownSymbol(symbol.to_string()))
}

fn timestamp_to_date(timestamp: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}

fn parse_quote(symbol: &str, body: &Value) -> MarketResult<Quote> {
    let node = result_node(body, "/quoteSummary/result/0/price", symbol)?;
    let price = node
        .pointer("/regularMarketPrice/raw")
        .and_then(Value::as_f64)
        .ok_or_else(|| MarketError::Malformed(format!("no market price for {symbol}")))?;

    Ok(Quote {
        symbol: symbol.to_uppercase(),
        price,
        market_cap: node.pointer("/marketCap/raw").and_then(Value::as_u64),
        volume: node
            .pointer("/regularMarketVolume/raw")
            .and_then(Value::as_u64),
    })
}

fn parse_history(symbol: &str, period: HistoryPeriod, body: &Value) -> MarketResult<PriceHistory> {
    let node = result_node(body, "/chart/result/0", symbol)?;
    let no_data = || MarketError::NoData {
        symbol: symbol.to_string(),
        period: period.as_str().to_string(),
    };

    let timestamps = node
        .pointer("/timestamp")
        .and_then(Value::as_array)
        .ok_or_else(no_data)?;
    let quote = node
        .pointer("/indicators/quote/0")
        .ok_or_else(|| MarketError::Malformed(format!("no quote indicators for {symbol}")))?;
    let series = |field: &str| quote.get(field).and_then(Value::as_array);
    let empty = Vec::new();
    let opens = series("open").unwrap_or(&empty);
    let highs = series("high").unwrap_or(&empty);
    let lows = series("low").unwrap_or(&empty);
    let closes = series("close").unwrap_or(&empty);
    let volumes = series("volume").unwrap_or(&empty);

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, raw) in timestamps.iter().enumerate() {
        let Some(date) = raw.as_i64().and_then(timestamp_to_date) else {
            continue;
        };
        // Halted or partial days come back as nulls, skip them
        let (Some(open), Some(high), Some(low), Some(close)) = (
            opens.get(i).and_then(Value::as_f64),
            highs.get(i).and_then(Value::as_f64),
            lows.get(i).and_then(Value::as_f64),
            closes.get(i).and_then(Value::as_f64),
        ) else {
            continue;
        };
        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            volume: volumes.get(i).and_then(Value::as_u64).unwrap_or(0),
        });
    }

    if bars.is_empty() {
        return Err(no_data());
    }
    Ok(PriceHistory {
        symbol: symbol.to_uppercase(),
        period,
        bars,
    })
}

fn parse_expirations(symbol: &str, body: &Value) -> MarketResult<Vec<NaiveDate>> {
    let node = result_node(body, "/optionChain/result/0", symbol)?;
    Ok(node
        .pointer("/expirationDates")
        .and_then(Value::as_array)
        .map(|dates| {
            dates
                .iter()
                .filter_map(Value::as_i64)
                .filter_map(timestamp_to_date)
                .collect()
        })
        .unwrap_or_default())
}

fn parse_chain(symbol: &str, side: OptionSide, body: &Value) -> MarketResult<Vec<OptionContract>> {
    let node = result_node(body, "/optionChain/result/0/options/0", symbol)?;
    let field = match side {
        OptionSide::Call => "calls",
        OptionSide::Put => "puts",
    };

    let mut chain: Vec<OptionContract> = node
        .get(field)
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    Some(OptionContract {
                        strike: row.get("strike").and_then(Value::as_f64)?,
                        last_price: row.get("lastPrice").and_then(Value::as_f64).unwrap_or(0.0),
                        bid: row.get("bid").and_then(Value::as_f64).unwrap_or(0.0),
                        ask: row.get("ask").and_then(Value::as_f64).unwrap_or(0.0),
                        volume: row.get("volume").and_then(Value::as_u64).unwrap_or(0),
                        open_interest: row
                            .get("openInterest")
                            .and_then(Value::as_u64)
                            .unwrap_or(0),
                        implied_volatility: row
                            .get("impliedVolatility")
                            .and_then(Value::as_f64)
                            .unwrap_or(0.0),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    chain.sort_by(|a, b| a.strike.total_cmp(&b.strike));
    Ok(chain)
}

fn parse_dividends(
    symbol: &str,
    body: &Value,
    cutoff: NaiveDate,
) -> MarketResult<Vec<DividendPayment>> {
    let node = result_node(body, "/chart/result/0", symbol)?;
    let mut payments: Vec<DividendPayment> = node
        .pointer("/events/dividends")
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .values()
                .filter_map(|dividend| {
                    let date = dividend
                        .get("date")
                        .and_then(Value::as_i64)
                        .and_then(timestamp_to_date)?;
                    let amount = dividend.get("amount").and_then(Value::as_f64)?;
                    Some(DividendPayment { date, amount })
                })
                .collect()
        })
        .unwrap_or_default();

    payments.retain(|payment| payment.date >= cutoff);
    payments.sort_by_key(|payment| payment.date);
    Ok(payments)
}

fn parse_earnings(symbol: &str, body: &Value) -> MarketResult<Vec<EarningsEvent>> {
    let node = result_node(body, "/quoteSummary/result/0/calendarEvents/earnings", symbol)?;
    let estimate = node.pointer("/earningsAverage/raw").and_then(Value::as_f64);

    Ok(node
        .pointer("/earningsDate")
        .and_then(Value::as_array)
        .map(|dates| {
            dates
                .iter()
                .filter_map(|date| {
                    date.get("raw")
                        .and_then(Value::as_i64)
                        .or_else(|| date.as_i64())
                })
                .filter_map(timestamp_to_date)
                .map(|date| EarningsEvent {
                    date,
                    eps_estimate: estimate,
                    eps_actual: None,
                })
                .collect()
        })
        .unwrap_or_default())
}
