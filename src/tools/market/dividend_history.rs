//! Dividend history tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::market::MarketDataProvider;
use crate::protocol::{McpTool, Tool};
use crate::tools::require_str;
use crate::types::McpResult;

const DEFAULT_YEARS_BACK: u64 = 5;

/// Tool for fetching historical dividend payments
pub struct GetDividendHistoryTool {
    provider: Arc<dyn MarketDataProvider>,
}

impl GetDividendHistoryTool {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for GetDividendHistoryTool {
    fn definition(&self) -> McpTool {
        McpTool {
            name: "get-dividend-history".to_string(),
            description: "Get the dividend payment history for a ticker".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "ticker": { "type": "string", "description": "Stock ticker symbol (e.g. KO)" },
                    "years_back": {
                        "type": "integer",
                        "description": "How many trailing years to include (default 5)"
                    }
                },
                "required": ["ticker"]
            }),
        }
    }

    async fn execute(&self, params: Value) -> McpResult<Value> {
        let ticker = require_str(&params, "ticker")?.to_uppercase();
        let years_back = params
            .get("years_back")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_YEARS_BACK)
            .clamp(1, 100) as u32;

        let payments = self.provider.dividends(&ticker, years_back).await?;
        if payments.is_empty() {
            return Ok(json!({
                "content": [{
                    "type": "text",
                    "text": format!("No dividends found for {ticker} in the last {years_back} years")
                }]
            }));
        }

        let total: f64 = payments.iter().map(|payment| payment.amount).sum();
        Ok(json!({
            "content": [{
                "type": "text",
                "text": format!(
                    "Dividend history for {} (last {} years, {} payments, ${:.2} per share total):\n{}",
                    ticker,
                    years_back,
                    payments.len(),
                    total,
                    serde_json::to_string_pretty(&payments)?
                )
            }]
        }))
    }
}
