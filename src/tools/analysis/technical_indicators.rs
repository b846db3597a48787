//! Technical indicators tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::market::{analysis, MarketDataProvider};
use crate::protocol::{McpTool, Tool};
use crate::tools::require_str;
use crate::types::{HistoryPeriod, McpResult};

const RSI_WINDOW: usize = 14;
const BOLLINGER_WINDOW: usize = 20;
const BOLLINGER_STD: f64 = 2.0;

/// Tool computing RSI, MACD and Bollinger bands over one year of closes
pub struct GetTechnicalIndicatorsTool {
    provider: Arc<dyn MarketDataProvider>,
}

impl GetTechnicalIndicatorsTool {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for GetTechnicalIndicatorsTool {
    fn definition(&self) -> McpTool {
        McpTool {
            name: "get-technical-indicators".to_string(),
            description: "Calculate technical indicators (RSI, MACD, Bollinger bands) for a symbol".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "symbol": { "type": "string", "description": "Stock ticker symbol (e.g. AAPL)" },
                    "indicators": {
                        "type": "array",
                        "items": { "type": "string", "enum": ["RSI", "MACD", "BB"] },
                        "description": "Indicators to compute (default all)"
                    }
                },
                "required": ["symbol"]
            }),
        }
    }

    async fn execute(&self, params: Value) -> McpResult<Value> {
        let symbol = require_str(&params, "symbol")?.to_uppercase();
        let requested: Vec<String> = params
            .get("indicators")
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_uppercase)
                    .collect()
            })
            .unwrap_or_else(|| vec!["RSI".to_string(), "MACD".to_string(), "BB".to_string()]);

        let history = self.provider.history(&symbol, HistoryPeriod::Year).await?;
        let closes = history.closes();

        let mut results = Map::new();
        for name in requested {
            let value = match name.as_str() {
                "RSI" => json!(analysis::rsi(&closes, RSI_WINDOW)),
                "MACD" => json!(analysis::macd(&closes)),
                "BB" => json!(analysis::bollinger(&closes, BOLLINGER_WINDOW, BOLLINGER_STD)),
                _ => json!("unsupported indicator"),
            };
            results.insert(name, value);
        }

        Ok(json!({
            "content": [{
                "type": "text",
                "text": format!(
                    "Technical indicators for {} (1y):\n{}",
                    history.symbol,
                    serde_json::to_string_pretty(&Value::Object(results))?
                )
            }]
        }))
    }
}
