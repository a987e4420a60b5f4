//! Market data port trait.

use crate::domain::error::StockpulseError;
use crate::domain::ohlcv::DailyBar;
use chrono::NaiveDate;

pub trait MarketDataPort {
    /// Daily bars for `symbol` between `start_date` and `end_date` inclusive,
    /// sorted by ascending date.
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyBar>, StockpulseError>;
}
