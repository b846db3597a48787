//! Risk metrics tool

use std::sync::Arc;

use async_trait::async_trait;
use futures::future;
use serde_json::{json, Value};

use crate::market::{analysis, MarketDataProvider};
use crate::protocol::{McpTool, Tool};
use crate::tools::require_str;
use crate::types::{HistoryPeriod, McpResult};

const DEFAULT_BENCHMARK: &str = "SPY";

/// Tool computing beta, volatility and Sharpe ratio against a benchmark
pub struct GetRiskMetricsTool {
    provider: Arc<dyn MarketDataProvider>,
}

impl GetRiskMetricsTool {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl Tool for GetRiskMetricsTool {
    fn definition(&self) -> McpTool {
        McpTool {
            name: "get-risk-metrics".to_string(),
            description: "Calculate beta, annualized volatility and Sharpe ratio for a symbol against a benchmark".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "symbol": { "type": "string", "description": "Stock ticker symbol (e.g. AAPL)" },
                    "benchmark": { "type": "string", "description": "Benchmark symbol (default SPY)" },
                    "period": {
                        "type": "string",
                        "enum": ["1mo", "3mo", "6mo", "1y", "2y", "5y"],
                        "description": "Lookback period (default 1y)"
                    }
                },
                "required": ["symbol"]
            }),
        }
    }

    async fn execute(&self, params: Value) -> McpResult<Value> {
        let symbol = require_str(&params, "symbol")?.to_uppercase();
        let benchmark = params
            .get("benchmark")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_BENCHMARK)
            .to_uppercase();
        let raw_period = params
            .get("period")
            .and_then(Value::as_str)
            .unwrap_or("1y");
        let period = HistoryPeriod::parse(raw_period)
            .ok_or_else(|| format!("invalid period: {raw_period}"))?;

        let (asset, index) = future::try_join(
            self.provider.history(&symbol, period),
            self.provider.history(&benchmark, period),
        )
        .await?;

        let asset_closes = asset.closes();
        let index_closes = index.closes();
        let shortest = asset_closes.len().min(index_closes.len());
        if shortest < 3 {
            return Err(format!("not enough overlapping {raw_period} data for {symbol}").into());
        }
        let asset_returns =
            analysis::daily_returns(&asset_closes[asset_closes.len() - shortest..]);
        let index_returns =
            analysis::daily_returns(&index_closes[index_closes.len() - shortest..]);

        let metrics = json!({
            "beta": analysis::beta(&asset_returns, &index_returns),
            "annualizedVolatility": analysis::annualized_volatility(&asset_returns),
            "sharpeRatio": analysis::sharpe_ratio(&asset_returns),
        });

        Ok(json!({
            "content": [{
                "type": "text",
                "text": format!(
                    "Risk metrics for {} vs {} ({}):\n{}",
                    asset.symbol,
                    index.symbol,
                    period.as_str(),
                    serde_json::to_string_pretty(&metrics)?
                )
            }]
        }))
    }
}
