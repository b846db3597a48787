//! Volatility ladder tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::market::{analysis, MarketDataProvider, MarketError};
use crate::protocol::{McpTool, Tool};
use crate::tools::require_str;
use crate::types::{HistoryPeriod, McpResult};

/// Lookback periods evaluated by the ladder, shortest first
const PERIODS: [HistoryPeriod; 8] = [
    HistoryPeriod::Day,
    HistoryPeriod::Week,
    HistoryPeriod::Month,
    HistoryPeriod::Quarter,
    HistoryPeriod::HalfYear,
    HistoryPeriod::Year,
    HistoryPeriod::TwoYears,
    HistoryPeriod::FiveYears,
];

/// Tool reporting the dispersion of returns over a ladder of lookbacks
pub struct CalculateVolatilityTool {
    provider: Arc<dyn MarketDataProvider>,
}

impl CalculateVolatilityTool {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for CalculateVolatilityTool {
    fn definition(&self) -> McpTool {
        McpTool {
            name: "calculate-all-volatility".to_string(),
            description: "Calculate the standard deviation of percent returns for a symbol over every standard lookback period".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "symbol": { "type": "string", "description": "Stock ticker symbol (e.g. AAPL)" }
                },
                "required": ["symbol"]
            }),
        }
    }

    async fn execute(&self, params: Value) -> McpResult<Value> {
        let symbol = require_str(&params, "symbol")?.to_uppercase();

        let mut ladder = Map::new();
        for period in PERIODS {
            let volatility = match self.provider.history(&symbol, period).await {
                Ok(history) => {
                    let returns = analysis::daily_returns(&history.closes());
                    // Reported in percent, matching how returns are quoted
                    analysis::std_dev(&returns).map(|dev| dev * 100.0)
                }
                // A lookback with no bars yet is reported as null
                Err(MarketError::NoData { .. }) => None,
                Err(other) => return Err(other.into()),
            };
            ladder.insert(period.as_str().to_string(), json!(volatility));
        }

        Ok(json!({
            "content": [{
                "type": "text",
                "text": format!(
                    "Standard deviation of percent returns for {}:\n{}",
                    symbol,
                    serde_json::to_string_pretty(&Value::Object(ladder))?
                )
            }]
        }))
    }
}
