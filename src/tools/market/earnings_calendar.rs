//! Earnings calendar tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::market::MarketDataProvider;
use crate::protocol::{McpTool, Tool};
use crate::tools::require_str;
use crate::types::McpResult;

/// Tool for fetching upcoming earnings dates and estimates
pub struct GetEarningsCalendarTool {
    provider: Arc<dyn MarketDataProvider>,
}

impl GetEarningsCalendarTool {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for GetEarningsCalendarTool {
    fn definition(&self) -> McpTool {
        McpTool {
            name: "get-earnings-calendar".to_string(),
            description: "Get upcoming earnings dates and consensus estimates for a ticker"
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
        let events = self.provider.earnings(&ticker).await?;

        let text = if events.is_empty() {
            format!("No earnings dates found for {ticker}")
        } else {
            format!(
                "Earnings calendar for {}:\n{}",
                ticker,
                serde_json::to_string_pretty(&events)?
            )
        };

        Ok(json!({
            "content": [{
                "type": "text",
                "text": text
            }]
        }))
    }
}
