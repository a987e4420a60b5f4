//! CSV directory market data adapter.
//!
//! Offline replacement for the HTTP provider. Each symbol lives in
//! `{base_path}/{SYMBOL}.csv` with a `date,open,high,low,close,volume` header.

use crate::domain::error::StockpulseError;
use crate::domain::ohlcv::DailyBar;
use crate::ports::data_port::MarketDataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

impl MarketDataPort for CsvAdapter {
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyBar>, StockpulseError> {
        let path = self.csv_path(symbol);
        let file = File::open(&path).map_err(|e| StockpulseError::Provider {
            symbol: symbol.to_string(),
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(file);
        let mut bars = Vec::new();

        for (line, result) in rdr.deserialize::<CsvRow>().enumerate() {
            let row = result.map_err(|e| StockpulseError::Provider {
                symbol: symbol.to_string(),
                reason: format!("CSV parse error: {}", e),
            })?;

            let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d").map_err(|e| {
                StockpulseError::Provider {
                    symbol: symbol.to_string(),
                    reason: format!("invalid date on row {}: {}", line + 1, e),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            bars.push(DailyBar {
                symbol: symbol.to_string(),
                date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume.unwrap_or(0.0) as i64,
            });
        }

        bars.sort_by_key(|b| b.date);
        debug!(symbol, path = %path.display(), bars = bars.len(), "loaded CSV bars");
        Ok(bars)
    }
}
