//! Current stock price tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::market::MarketDataProvider;
use crate::protocol::{McpTool, Tool};
use crate::tools::require_str;
use crate::types::McpResult;

/// Tool for fetching the current price, market cap and volume of a ticker
pub struct GetStockPriceTool {
    provider: Arc<dyn MarketDataProvider>,
}

impl GetStockPriceTool {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for GetStockPriceTool {
    fn definition(&self) -> McpTool {
        McpTool {
            name: "get-stock-price-data".to_string(),
            description: "Get the current stock price, market cap and trading volume for a ticker"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ticker": { "type": "string", "description": "Stock ticker symbol (e.g. AAPL)" }
                },
                "required": ["ticker"]
            }),
        }
    }

    async fn execute(&self, params: Value) -> McpResult<Value> {
        let ticker = require_str(&params, "ticker")?.to_uppercase();
        let quote = self.provider.quote(&ticker).await?;

        let market_cap = quote
            .market_cap
            .map(|cap| format!("${cap}"))
            .unwrap_or_else(|| "N/A".to_string());
        let volume = quote
            .volume
            .map(|volume| volume.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        Ok(json!({
            "content": [{
                "type": "text",
                "text": format!(
                    "Current price for {}: ${:.2}\nMarket Cap: {}\nVolume: {}",
                    quote.symbol, quote.price, market_cap, volume
                )
            }]
        }))
    }
}
