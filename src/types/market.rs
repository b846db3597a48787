//! Market data types shared by providers, analysis and tools

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Snapshot quote for a single ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    #[serde(rename = "marketCap", skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

/// Single OHLCV bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Price history for one symbol over one period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub period: HistoryPeriod,
    pub bars: Vec<PriceBar>,
}

impl PriceHistory {
    /// Latest closing price, if any bars exist
    pub fn latest_close(&self) -> Option<f64> {
        self.bars.last().map(|bar| bar.close)
    }

    /// Closing prices in chronological order
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }
}

/// Supported history lookback periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryPeriod {
    #[serde(rename = "1d")]
    Day,
    #[serde(rename = "5d")]
    Week,
    #[serde(rename = "1mo")]
    Month,
    #[serde(rename = "3mo")]
    Quarter,
    #[serde(rename = "6mo")]
    HalfYear,
    #[serde(rename = "1y")]
    Year,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl HistoryPeriod {
    /// Parse the wire form used by tool arguments ("1d", "1mo", ...)
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "1d" => Self::Day,
            "5d" => Self::Week,
            "1mo" => Self::Month,
            "3mo" => Self::Quarter,
            "6mo" => Self::HalfYear,
            "1y" => Self::Year,
            "2y" => Self::TwoYears,
            "5y" => Self::FiveYears,
            "10y" => Self::TenYears,
            "ytd" => Self::YearToDate,
            "max" => Self::Max,
            _ => return None,
        })
    }

    /// Wire form used in provider URLs and tool output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "1d",
            Self::Week => "5d",
            Self::Month => "1mo",
            Self::Quarter => "3mo",
            Self::HalfYear => "6mo",
            Self::Year => "1y",
            Self::TwoYears => "2y",
            Self::FiveYears => "5y",
            Self::TenYears => "10y",
            Self::YearToDate => "ytd",
            Self::Max => "max",
        }
    }

    /// Approximate number of trading days covered by the period
    pub fn trading_days(&self) -> usize {
        match self {
            Self::Day => 1,
            Self::Week => 5,
            Self::Month => 21,
            Self::Quarter => 63,
            Self::HalfYear => 126,
            Self::Year => 252,
            Self::TwoYears => 504,
            Self::FiveYears => 1260,
            Self::TenYears => 2520,
            Self::YearToDate => 252,
            Self::Max => 2520,
        }
    }
}

/// One historical dividend payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DividendPayment {
    pub date: NaiveDate,
    pub amount: f64,
}

/// One upcoming or past earnings report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningsEvent {
    pub date: NaiveDate,
    #[serde(rename = "epsEstimate", skip_serializing_if = "Option::is_none")]
    pub eps_estimate: Option<f64>,
    #[serde(rename = "epsActual", skip_serializing_if = "Option::is_none")]
    pub eps_actual: Option<f64>,
}

/// Option contract side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionSide {
    Call,
    Put,
}

impl OptionSide {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "call" => Some(Self::Call),
            "put" => Some(Self::Put),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Put => "put",
        }
    }
}

/// Single row of an options chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    pub strike: f64,
    #[serde(rename = "lastPrice")]
    pub last_price: f64,
    pub bid: f64,
    pub ask: f64,
    pub volume: u64,
    #[serde(rename = "openInterest")]
    pub open_interest: u64,
    #[serde(rename = "impliedVolatility")]
    pub implied_volatility: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_round_trip() {
        for raw in ["1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max"] {
            let period = HistoryPeriod::parse(raw).unwrap();
            assert_eq!(period.as_str(), raw);
        }
        assert!(HistoryPeriod::parse("7w").is_none());
    }

    #[test]
    fn test_period_serde_uses_wire_form() {
        let json = serde_json::to_string(&HistoryPeriod::Month).unwrap();
        assert_eq!(json, "\"1mo\"");
        let back: HistoryPeriod = serde_json::from_str("\"2y\"").unwrap();
        assert_eq!(back, HistoryPeriod::TwoYears);
    }

    #[test]
    fn test_latest_close() {
        let history = PriceHistory {
            symbol: "AAPL".to_string(),
            period: HistoryPeriod::Week,
            bars: vec![
                PriceBar {
                    date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                    open: 100.0,
                    high: 102.0,
                    low: 99.0,
                    close: 101.0,
                    volume: 1_000,
                },
                PriceBar {
                    date: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
                    open: 101.0,
                    high: 104.0,
                    low: 100.5,
                    close: 103.5,
                    volume: 1_200,
                },
            ],
        };
        assert_eq!(history.latest_close(), Some(103.5));
        assert_eq!(history.closes(), vec![101.0, 103.5]);
    }

    #[test]
    fn test_option_side_parse() {
        assert_eq!(OptionSide::parse("call"), Some(OptionSide::Call));
        assert_eq!(OptionSide::parse("put"), Some(OptionSide::Put));
        assert!(OptionSide::parse("straddle").is_none());
    }
}
