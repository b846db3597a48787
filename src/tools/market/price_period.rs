//! Price history tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::market::MarketDataProvider;
use crate::protocol::{McpTool, Tool};
use crate::tools::require_str;
use crate::types::{HistoryPeriod, McpResult};

/// Tool for fetching price history over a lookback period
pub struct GetPricePeriodTool {
    provider: Arc<dyn MarketDataProvider>,
}

impl GetPricePeriodTool {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for GetPricePeriodTool {
    fn definition(&self) -> McpTool {
        McpTool {
            name: "get-stock-price-period".to_string(),
            description: "Get daily price bars for a ticker over a lookback period".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ticker": { "type": "string", "description": "Stock ticker symbol (e.g. AAPL)" },
                    "timeframe": {
                        "type": "string",
                        "enum": ["1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max"],
                        "description": "Lookback period (default 1d)"
                    }
                },
                "required": ["ticker"]
            }),
        }
    }

    async fn execute(&self, params: Value) -> McpResult<Value> {
        let ticker = require_str(&params, "ticker")?.to_uppercase();
        let timeframe = params
            .get("timeframe")
            .and_then(Value::as_str)
            .unwrap_or("1d");
        let period = HistoryPeriod::parse(timeframe)
            .ok_or_else(|| format!("invalid timeframe: {timeframe}"))?;

        let history = self.provider.history(&ticker, period).await?;
        let latest = history
            .latest_close()
            .ok_or_else(|| format!("no price data for {ticker}"))?;

        Ok(json!({
            "content": [{
                "type": "text",
                "text": format!(
                    "Latest price for {} ({}): ${:.2}\nData: {}",
                    history.symbol,
                    period.as_str(),
                    latest,
                    serde_json::to_string_pretty(&history.bars)?
                )
            }]
        }))
    }
}
