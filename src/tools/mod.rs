//! MCP Tools implementation
//!
//! This module contains all 10 MCP tools organized by category:
//! - Market data tools (6): quotes, history, options, dividends, earnings
//! - Analysis tools (4): volatility, indicators, correlations, risk
//!
//! Every tool talks to the market layer through the
//! [`MarketDataProvider`] trait, so the whole set runs against either
//! the live Yahoo provider or the offline one.

pub mod analysis;
pub mod market;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::market::MarketDataProvider;
use crate::protocol::{McpTool, Tool};
use crate::types::McpResult;

// Re-export all tools for convenience
pub use analysis::{
    CalculateCorrelationsTool, CalculateVolatilityTool, GetRiskMetricsTool,
    GetTechnicalIndicatorsTool,
};
pub use market::{
    GetDividendHistoryTool, GetEarningsCalendarTool, GetOptionsChainTool, GetOptionsDatesTool,
    GetPricePeriodTool, GetStockPriceTool,
};

/// Named collection of tools, listed in registration order
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Tool definitions for tools/list, in registration order
    pub fn definitions(&self) -> Vec<McpTool> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.definition())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Build a registry with every tool wired to the given provider
pub fn build_registry(provider: Arc<dyn MarketDataProvider>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    // Market data tools (6)
    registry.register(Arc::new(GetStockPriceTool::new(provider.clone())));
    registry.register(Arc::new(GetPricePeriodTool::new(provider.clone())));
    registry.register(Arc::new(GetOptionsDatesTool::new(provider.clone())));
    registry.register(Arc::new(GetOptionsChainTool::new(provider.clone())));
    registry.register(Arc::new(GetDividendHistoryTool::new(provider.clone())));
    registry.register(Arc::new(GetEarningsCalendarTool::new(provider.clone())));

    // Analysis tools (4)
    registry.register(Arc::new(CalculateVolatilityTool::new(provider.clone())));
    registry.register(Arc::new(GetTechnicalIndicatorsTool::new(provider.clone())));
    registry.register(Arc::new(CalculateCorrelationsTool::new(provider.clone())));
    registry.register(Arc::new(GetRiskMetricsTool::new(provider)));

    registry
}

/// Extract a required string argument from tool parameters
pub(crate) fn require_str<'a>(params: &'a Value, field: &str) -> McpResult<&'a str> {
    params
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| format!("missing required argument: {field}").into())
}
