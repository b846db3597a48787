//! MCP Tool Integration Tests
//!
//! Drives all 10 tools through the registry with the deterministic
//! offline provider, covering:
//! - Happy path responses and their content shape
//! - Argument validation and defaulting
//! - Error propagation for unknown symbols

use std::sync::Arc;

use serde_json::{json, Value};

use market_stream::market::{MarketDataProvider, OfflineProvider};
use market_stream::tools::{build_registry, ToolRegistry};
use market_stream::types::McpResult;

fn test_registry() -> ToolRegistry {
    build_registry(Arc::new(OfflineProvider::default()))
}

async fn call(registry: &ToolRegistry, name: &str, args: Value) -> McpResult<Value> {
    registry
        .get(name)
        .unwrap_or_else(|| panic!("tool {name} not registered"))
        .execute(args)
        .await
}

fn content_text(result: &Value) -> &str {
    result["content"][0]["text"]
        .as_str()
        .expect("tool result should carry text content")
}

#[tokio::test]
async fn test_registry_exposes_all_tools() {
    let registry = test_registry();
    let names: Vec<String> = registry
        .definitions()
        .into_iter()
        .map(|tool| tool.name)
        .collect();

    assert_eq!(names.len(), 10);
    for name in [
        "get-stock-price-data",
        "get-stock-price-period",
        "get-options-dates",
        "get-options-chain",
        "get-dividend-history",
        "get-earnings-calendar",
        "calculate-all-volatility",
        "get-technical-indicators",
        "calculate-correlations",
        "get-risk-metrics",
    ] {
        assert!(names.contains(&name.to_string()), "missing tool {name}");
    }
}

#[tokio::test]
async fn test_tool_schemas_are_objects() {
    let registry = test_registry();
    for tool in registry.definitions() {
        assert_eq!(
            tool.input_schema["type"], "object",
            "schema for {} should be an object",
            tool.name
        );
        assert!(!tool.description.is_empty());
    }
}

#[tokio::test]
async fn test_stock_price_data() {
    let registry = test_registry();
    let result = call(&registry, "get-stock-price-data", json!({"ticker": "AAPL"}))
        .await
        .unwrap();

    let text = content_text(&result);
    assert!(text.starts_with("Current price for AAPL: $"), "got: {text}");
    assert!(text.contains("Market Cap:"));
    assert!(text.contains("Volume:"));
}

#[tokio::test]
async fn test_stock_price_requires_ticker() {
    let registry = test_registry();

    assert!(call(&registry, "get-stock-price-data", json!({}))
        .await
        .is_err());
    assert!(
        call(&registry, "get-stock-price-data", json!({"ticker": "  "}))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_stock_price_rejects_unknown_symbol() {
    let registry = test_registry();
    let result = call(&registry, "get-stock-price-data", json!({"ticker": "BAD SYMBOL!"})).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_price_period_defaults_to_one_day() {
    let registry = test_registry();
    let result = call(&registry, "get-stock-price-period", json!({"ticker": "MSFT"}))
        .await
        .unwrap();

    let text = content_text(&result);
    assert!(text.starts_with("Latest price for MSFT (1d): $"), "got: {text}");
    assert!(text.contains("Data:"));
}

#[tokio::test]
async fn test_price_period_accepts_timeframe() {
    let registry = test_registry();
    let result = call(
        &registry,
        "get-stock-price-period",
        json!({"ticker": "MSFT", "timeframe": "6mo"}),
    )
    .await
    .unwrap();

    assert!(content_text(&result).contains("(6mo)"));
}

#[tokio::test]
async fn test_price_period_rejects_bad_timeframe() {
    let registry = test_registry();
    let error = call(
        &registry,
        "get-stock-price-period",
        json!({"ticker": "MSFT", "timeframe": "7q"}),
    )
    .await
    .unwrap_err();

    assert!(error.to_string().contains("invalid timeframe"));
}

#[tokio::test]
async fn test_options_dates() {
    let registry = test_registry();
    let result = call(&registry, "get-options-dates", json!({"ticker": "AAPL"}))
        .await
        .unwrap();

    let text = content_text(&result);
    assert!(text.starts_with("Available options dates for AAPL:"), "got: {text}");
}

#[tokio::test]
async fn test_options_chain_with_nearest_strikes() {
    let provider = OfflineProvider::default();
    let expirations = provider.options_expirations("AAPL").await.unwrap();
    let expiration = expirations[0].format("%Y-%m-%d").to_string();

    let registry = test_registry();
    let result = call(
        &registry,
        "get-options-chain",
        json!({
            "ticker": "AAPL",
            "expiration_date": expiration,
            "number_strikes": 3,
        }),
    )
    .await
    .unwrap();

    let text = content_text(&result);
    assert!(text.starts_with("Options chain for AAPL (call, expiring"), "got: {text}");
    assert!(text.contains("\"strike\""));
}

#[tokio::test]
async fn test_options_chain_put_side() {
    let provider = OfflineProvider::default();
    let expirations = provider.options_expirations("AAPL").await.unwrap();
    let expiration = expirations[0].format("%Y-%m-%d").to_string();

    let registry = test_registry();
    let result = call(
        &registry,
        "get-options-chain",
        json!({
            "ticker": "AAPL",
            "expiration_date": expiration,
            "options_type": "put",
        }),
    )
    .await
    .unwrap();

    assert!(content_text(&result).contains("(put, expiring"));
}

#[tokio::test]
async fn test_options_chain_requires_expiration() {
    let registry = test_registry();
    assert!(
        call(&registry, "get-options-chain", json!({"ticker": "AAPL"}))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_options_chain_rejects_bad_side() {
    let provider = OfflineProvider::default();
    let expirations = provider.options_expirations("AAPL").await.unwrap();
    let expiration = expirations[0].format("%Y-%m-%d").to_string();

    let registry = test_registry();
    let error = call(
        &registry,
        "get-options-chain",
        json!({
            "ticker": "AAPL",
            "expiration_date": expiration,
            "options_type": "straddle",
        }),
    )
    .await
    .unwrap_err();

    assert!(error.to_string().contains("invalid options_type"));
}

#[tokio::test]
async fn test_dividend_history_defaults_to_five_years() {
    let registry = test_registry();
    let result = call(&registry, "get-dividend-history", json!({"ticker": "KO"}))
        .await
        .unwrap();

    let text = content_text(&result);
    assert!(text.starts_with("Dividend history for KO (last 5 years,"), "got: {text}");
    assert!(text.contains("per share total"));
}

#[tokio::test]
async fn test_dividend_history_clamps_years() {
    let registry = test_registry();
    let result = call(
        &registry,
        "get-dividend-history",
        json!({"ticker": "KO", "years_back": 0}),
    )
    .await
    .unwrap();

    assert!(content_text(&result).contains("(last 1 years,"));
}

#[tokio::test]
async fn test_earnings_calendar() {
    let registry = test_registry();
    let result = call(&registry, "get-earnings-calendar", json!({"ticker": "AAPL"}))
        .await
        .unwrap();

    let text = content_text(&result);
    assert!(text.starts_with("Earnings calendar for AAPL:"), "got: {text}");
    assert!(text.contains("\"date\""));
}

#[tokio::test]
async fn test_volatility_ladder_covers_all_periods() {
    let registry = test_registry();
    let result = call(&registry, "calculate-all-volatility", json!({"symbol": "aapl"}))
        .await
        .unwrap();

    let text = content_text(&result);
    assert!(
        text.starts_with("Standard deviation of percent returns for AAPL:"),
        "got: {text}"
    );
    for period in ["1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y"] {
        assert!(text.contains(&format!("\"{period}\"")), "missing period {period}");
    }
}

#[tokio::test]
async fn test_technical_indicators_defaults() {
    let registry = test_registry();
    let result = call(
        &registry,
        "get-technical-indicators",
        json!({"symbol": "AAPL"}),
    )
    .await
    .unwrap();

    let text = content_text(&result);
    assert!(text.starts_with("Technical indicators for AAPL (1y):"), "got: {text}");
    assert!(text.contains("RSI"));
    assert!(text.contains("MACD"));
    assert!(text.contains("BB"));
}

#[tokio::test]
async fn test_technical_indicators_flags_unknown_indicator() {
    let registry = test_registry();
    let result = call(
        &registry,
        "get-technical-indicators",
        json!({"symbol": "AAPL", "indicators": ["XYZ"]}),
    )
    .await
    .unwrap();

    assert!(content_text(&result).contains("unsupported indicator"));
}

#[tokio::test]
async fn test_correlations_uppercases_symbols() {
    let registry = test_registry();
    let result = call(
        &registry,
        "calculate-correlations",
        json!({"symbols_list": ["aapl", "msft", "goog"]}),
    )
    .await
    .unwrap();

    let text = content_text(&result);
    assert!(
        text.starts_with("Correlation matrix for AAPL, MSFT, GOOG (1y):"),
        "got: {text}"
    );
    assert!(text.contains("\"AAPL\""));
}

#[tokio::test]
async fn test_correlations_need_at_least_two_symbols() {
    let registry = test_registry();
    assert!(call(
        &registry,
        "calculate-correlations",
        json!({"symbols_list": ["AAPL"]}),
    )
    .await
    .is_err());
}

#[tokio::test]
async fn test_risk_metrics_against_default_benchmark() {
    let registry = test_registry();
    let result = call(&registry, "get-risk-metrics", json!({"symbol": "AAPL"}))
        .await
        .unwrap();

    let text = content_text(&result);
    assert!(text.starts_with("Risk metrics for AAPL vs SPY (1y):"), "got: {text}");
    assert!(text.contains("\"beta\""));
    assert!(text.contains("\"annualizedVolatility\""));
    assert!(text.contains("\"sharpeRatio\""));
}

#[tokio::test]
async fn test_risk_metrics_custom_benchmark() {
    let registry = test_registry();
    let result = call(
        &registry,
        "get-risk-metrics",
        json!({"symbol": "AAPL", "benchmark": "QQQ"}),
    )
    .await
    .unwrap();

    assert!(content_text(&result).contains("vs QQQ"));
}
