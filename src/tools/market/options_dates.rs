//! Options expiration dates tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::market::MarketDataProvider;
use crate::protocol::{McpTool, Tool};
use crate::tools::require_str;
use crate::types::McpResult;

/// Tool for listing expiration dates with listed options
pub struct GetOptionsDatesTool {
    provider: Arc<dyn MarketDataProvider>,
}

impl GetOptionsDatesTool {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for GetOptionsDatesTool {
    fn definition(&self) -> McpTool {
        McpTool {
            name: "get-options-dates".to_string(),
            description: "List the available options expiration dates for a ticker".to_string(),
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
        let dates = self.provider.options_expirations(&ticker).await?;

        let text = if dates.is_empty() {
            format!("No options dates found for {ticker}")
        } else {
            let formatted: Vec<String> = dates.iter().map(|date| date.to_string()).collect();
            format!(
                "Available options dates for {}: {}",
                ticker,
                formatted.join(", ")
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
