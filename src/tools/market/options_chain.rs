//! Options chain tool

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::market::MarketDataProvider;
use crate::protocol::{McpTool, Tool};
use crate::tools::require_str;
use crate::types::{McpResult, OptionSide};

const DEFAULT_STRIKES: usize = 5;

/// Tool for fetching an options chain around the current price
pub struct GetOptionsChainTool {
    provider: Arc<dyn MarketDataProvider>,
}

impl GetOptionsChainTool {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for GetOptionsChainTool {
    fn definition(&self) -> McpTool {
        McpTool {
            name: "get-options-chain".to_string(),
            description: "Get the options chain for a ticker and expiration, limited to the strikes nearest the current price".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ticker": { "type": "string", "description": "Stock ticker symbol (e.g. AAPL)" },
                    "options_type": {
                        "type": "string",
                        "enum": ["call", "put"],
                        "description": "Option side (default call)"
                    },
                    "expiration_date": {
                        "type": "string",
                        "description": "Expiration date as YYYY-MM-DD, see get-options-dates"
                    },
                    "number_strikes": {
                        "type": "integer",
                        "description": "How many strikes around the current price (default 5)"
                    }
                },
                "required": ["ticker", "expiration_date"]
            }),
        }
    }

    async fn execute(&self, params: Value) -> McpResult<Value> {
        let ticker = require_str(&params, "ticker")?.to_uppercase();
        let raw_side = params
            .get("options_type")
            .and_then(Value::as_str)
            .unwrap_or("call");
        let side = OptionSide::parse(raw_side)
            .ok_or_else(|| format!("invalid options_type: {raw_side}"))?;
        let raw_date = require_str(&params, "expiration_date")?;
        let expiration = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|_| format!("invalid expiration_date: {raw_date}, expected YYYY-MM-DD"))?;
        let number_strikes = params
            .get("number_strikes")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_STRIKES as u64) as usize;

        let mut chain = self.provider.options_chain(&ticker, side, expiration).await?;
        if chain.is_empty() {
            return Ok(json!({
                "content": [{
                    "type": "text",
                    "text": format!("No {} options found for {} expiring {}", side.as_str(), ticker, expiration)
                }]
            }));
        }

        // Keep the strikes nearest the spot price, then restore strike order
        let spot = self.provider.quote(&ticker).await?.price;
        chain.sort_by(|a, b| {
            (a.strike - spot)
                .abs()
                .total_cmp(&(b.strike - spot).abs())
        });
        chain.truncate(number_strikes.max(1));
        chain.sort_by(|a, b| a.strike.total_cmp(&b.strike));

        Ok(json!({
            "content": [{
                "type": "text",
                "text": format!(
                    "Options chain for {} ({}, expiring {}):\n{}",
                    ticker,
                    side.as_str(),
                    expiration,
                    serde_json::to_string_pretty(&chain)?
                )
            }]
        }))
    }
}
