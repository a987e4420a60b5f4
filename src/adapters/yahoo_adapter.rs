//! Yahoo Finance chart API market data adapter.
//!
//! Queries `{base_url}/v8/finance/chart/{symbol}` for daily bars between two
//! dates. Bars without a close price (holidays, halted sessions) are dropped.

use crate::domain::error::StockpulseError;
use crate::domain::ohlcv::DailyBar;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use chrono::{DateTime, Duration, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
pub const DEFAULT_TIMEOUT_SECS: i64 = 30;
const USER_AGENT: &str = concat!("stockpulse/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartEnvelope,
}

#[derive(Deserialize, Debug)]
struct ChartEnvelope {
    result: Option<Vec<ChartItem>>,
    error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    #[serde(alias = "gmtoffset")]
    gmt_offset: Option<i64>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Deserialize, Debug, Default)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

pub struct YahooFinanceAdapter {
    base_url: String,
    client: Client,
}

impl YahooFinanceAdapter {
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self, StockpulseError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| StockpulseError::Provider {
                symbol: String::new(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockpulseError> {
        let base_url = config
            .get_string("yahoo", "base_url")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = config
            .get_int("yahoo", "timeout_secs", DEFAULT_TIMEOUT_SECS)
            .max(1) as u64;

        Self::new(&base_url, std::time::Duration::from_secs(timeout_secs))
    }

    fn chart_url(&self, symbol: &str, start_date: NaiveDate, end_date: NaiveDate) -> String {
        // period2 is exclusive, so the end date is pushed one day forward
        let period1 = start_date.and_hms_opt(0, 0, 0).map_or(0, |d| d.and_utc().timestamp());
        let period2 = (end_date + Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .map_or(0, |d| d.and_utc().timestamp());

        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url, symbol, period1, period2
        )
    }
}

fn provider_error(symbol: &str, reason: impl Into<String>) -> StockpulseError {
    StockpulseError::Provider {
        symbol: symbol.to_string(),
        reason: reason.into(),
    }
}

fn bars_from_item(symbol: &str, item: ChartItem) -> Vec<DailyBar> {
    let offset = item.meta.and_then(|m| m.gmt_offset).unwrap_or(0);
    let timestamps = item.timestamp.unwrap_or_default();
    let quote = item
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .unwrap_or_default();

    let at = |series: &[Option<f64>], i: usize| series.get(i).copied().flatten();

    timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = at(&quote.close, i)?;
            let date = DateTime::from_timestamp(ts + offset, 0)?.date_naive();
            Some(DailyBar {
                symbol: symbol.to_string(),
                date,
                open: at(&quote.open, i).unwrap_or(close),
                high: at(&quote.high, i).unwrap_or(close),
                low: at(&quote.low, i).unwrap_or(close),
                close,
                volume: at(&quote.volume, i).unwrap_or(0.0) as i64,
            })
        })
        .collect()
}

impl MarketDataPort for YahooFinanceAdapter {
    #[instrument(name = "YahooChartFetch", skip(self), fields(symbol = %symbol))]
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyBar>, StockpulseError> {
        let url = self.chart_url(symbol, start_date, end_date);
        debug!("Requesting chart data from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| provider_error(symbol, format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(provider_error(symbol, format!("HTTP status {}", status)));
        }

        let data: YahooChartResponse = response
            .json()
            .map_err(|e| provider_error(symbol, format!("invalid response body: {}", e)))?;

        if let Some(err) = data.chart.error {
            debug!(code = ?err.code, description = ?err.description, "chart API returned an error");
            return Err(StockpulseError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let item = data
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| StockpulseError::NoData {
                symbol: symbol.to_string(),
            })?;

        let mut bars = bars_from_item(symbol, item);
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        bars.sort_by_key(|b| b.date);
        debug!(bars = bars.len(), "parsed chart data");
        Ok(bars)
    }
}
