//! Correlation matrix tool

use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
use serde_json::{json, Map, Value};

use crate::market::{analysis, MarketDataProvider};
use crate::protocol::{McpTool, Tool};
use crate::types::{HistoryPeriod, McpResult};

/// Tool computing pairwise return correlations between symbols
pub struct CalculateCorrelationsTool {
    provider: Arc<dyn MarketDataProvider>,
}

impl CalculateCorrelationsTool {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for CalculateCorrelationsTool {
    fn definition(&self) -> McpTool {
        McpTool {
            name: "calculate-correlations".to_string(),
            description: "Calculate the correlation matrix of daily returns for a list of symbols".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "symbols_list": {
                        "type": "array",
                        "items": { "type": "string" },
                        "minItems": 2,
                        "description": "Ticker symbols to correlate (at least two)"
                    },
                    "period": {
                        "type": "string",
                        "enum": ["1mo", "3mo", "6mo", "1y", "2y", "5y"],
                        "description": "Lookback period (default 1y)"
                    }
                },
                "required": ["symbols_list"]
            }),
        }
    }

    async fn execute(&self, params: Value) -> McpResult<Value> {
        let symbols: Vec<String> = params
            .get("symbols_list")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_uppercase)
                    .collect()
            })
            .unwrap_or_default();
        if symbols.len() < 2 {
            return Err("symbols_list needs at least two symbols".into());
        }

        let raw_period = params
            .get("period")
            .and_then(Value::as_str)
            .unwrap_or("1y");
        let period = HistoryPeriod::parse(raw_period)
            .ok_or_else(|| format!("invalid period: {raw_period}"))?;

        let fetches = symbols
            .iter()
            .map(|symbol| self.provider.history(symbol, period));
        let series: Vec<Vec<f64>> = future::try_join_all(fetches)
            .await?
            .iter()
            .map(|history| history.closes())
            .collect();

        // Trim every series to the shortest one so returns line up
        let shortest = series.iter().map(Vec::len).min().unwrap_or(0);
        if shortest < 3 {
            return Err(format!("not enough overlapping {raw_period} data to correlate").into());
        }
        let returns: Vec<Vec<f64>> = series
            .iter()
            .map(|closes| analysis::daily_returns(&closes[closes.len() - shortest..]))
            .collect();

        let mut matrix = Map::new();
        for (i, symbol) in symbols.iter().enumerate() {
            let mut row = Map::new();
            for (j, other) in symbols.iter().enumerate() {
                row.insert(
                    other.clone(),
                    json!(analysis::correlation(&returns[i], &returns[j])),
                );
            }
            matrix.insert(symbol.clone(), Value::Object(row));
        }

        Ok(json!({
            "content": [{
                "type": "text",
                "text": format!(
                    "Correlation matrix for {} ({}):\n{}",
                    symbols.join(", "),
                    period.as_str(),
                    serde_json::to_string_pretty(&Value::Object(matrix))?
                )
            }]
        }))
    }
}
