//! Market analysis tools

mod correlations;
mod risk_metrics;
mod technical_indicators;
mod volatility;

pub use correlations::CalculateCorrelationsTool;
pub use risk_metrics::GetRiskMetricsTool;
pub use technical_indicators::GetTechnicalIndicatorsTool;
pub use volatility::CalculateVolatilityTool;
