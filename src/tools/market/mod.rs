//! Market data tools

mod dividend_history;
mod earnings_calendar;
mod options_chain;
mod options_dates;
mod price_period;
mod stock_price;

pub use dividend_history::GetDividendHistoryTool;
pub use earnings_calendar::GetEarningsCalendarTool;
pub use options_chain::GetOptionsChainTool;
pub use options_dates::GetOptionsDatesTool;
pub use price_period::GetPricePeriodTool;
pub use stock_price::GetStockPriceTool;
