//! Per-symbol analysis pipeline and the batch loop over a symbol list.
//!
//! A batch run is synchronous and handles one symbol at a time. A failure for
//! one symbol (fetch, analysis, chart or store) is logged and the symbol is
//! skipped; the loop always continues with the next symbol.

use chrono::{Duration, NaiveDate};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::domain::error::StockpulseError;
use crate::domain::forecast::{self, Forecast};
use crate::domain::indicator::{
    compute_indicators, IndicatorSeries, IndicatorType, MA_LONG, MA_MEDIUM, MA_SHORT, RSI_PERIOD,
    STANDARD_INDICATORS,
};
use crate::domain::ohlcv::DailyBar;
use crate::domain::recommendation::{self, LatestIndicators, Recommendation, Signal};
use crate::ports::chart_port::ChartPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::store_port::AnalysisStorePort;

pub const DEFAULT_LOOKBACK_DAYS: i64 = 1500;

/// One row of the analysis table.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub symbol: String,
    pub date: NaiveDate,
    pub price: f64,
    pub ma50: Option<f64>,
    pub ma100: Option<f64>,
    pub ma200: Option<f64>,
    pub rsi: Option<f64>,
    pub recommendation: Recommendation,
}

/// A record read back from the store with its row id.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub id: i64,
    pub record: AnalysisRecord,
}

#[derive(Debug, Clone)]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub bars: Vec<DailyBar>,
    pub records: Vec<AnalysisRecord>,
    pub signal: Signal,
}

impl SymbolAnalysis {
    pub fn last_price(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

/// Computes indicators for `bars` and evaluates the rule on the last bar.
/// Every record carries the recommendation of this run.
pub fn analyze_bars(symbol: &str, bars: Vec<DailyBar>) -> Result<SymbolAnalysis, StockpulseError> {
    if bars.is_empty() {
        return Err(StockpulseError::NoData {
            symbol: symbol.to_string(),
        });
    }

    let indicators = compute_indicators(&bars, &STANDARD_INDICATORS);
    let ma50: &IndicatorSeries = &indicators[&IndicatorType::Sma(MA_SHORT)];
    let ma100: &IndicatorSeries = &indicators[&IndicatorType::Sma(MA_MEDIUM)];
    let ma200: &IndicatorSeries = &indicators[&IndicatorType::Sma(MA_LONG)];
    let rsi: &IndicatorSeries = &indicators[&IndicatorType::Rsi(RSI_PERIOD)];

    let last = bars.len() - 1;
    let latest = LatestIndicators {
        close: bars[last].close,
        ma50: ma50.value_at(last),
        ma100: ma100.value_at(last),
        ma200: ma200.value_at(last),
        rsi: rsi.value_at(last),
    };
    let signal = recommendation::evaluate(&latest);
    debug!(symbol, ?latest, score = signal.score, "evaluated recommendation");

    let records = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| AnalysisRecord {
            symbol: symbol.to_string(),
            date: bar.date,
            price: bar.close,
            ma50: ma50.value_at(i),
            ma100: ma100.value_at(i),
            ma200: ma200.value_at(i),
            rsi: rsi.value_at(i),
            recommendation: signal.recommendation,
        })
        .collect();

    Ok(SymbolAnalysis {
        symbol: symbol.to_string(),
        bars,
        records,
        signal,
    })
}

pub fn analyze_symbol(
    data_port: &dyn MarketDataPort,
    symbol: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<SymbolAnalysis, StockpulseError> {
    let bars = data_port.fetch_daily_bars(symbol, start_date, end_date)?;
    debug!(symbol, bars = bars.len(), "fetched daily bars");
    analyze_bars(symbol, bars)
}

/// `date` minus `days`, clamped to the earliest representable date.
pub fn days_before(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_sub_signed(delta))
        .unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone)]
pub struct ForecastOptions {
    pub lookback_days: i64,
    pub horizon_days: usize,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            lookback_days: forecast::DEFAULT_LOOKBACK_DAYS,
            horizon_days: forecast::DEFAULT_HORIZON_DAYS,
        }
    }
}

/// Fits the trend on the bars inside the forecast lookback window ending at
/// `today` and extrapolates from `today`.
pub fn forecast_from_bars(
    symbol: &str,
    bars: &[DailyBar],
    options: &ForecastOptions,
    today: NaiveDate,
) -> Option<Forecast> {
    let cutoff = days_before(today, options.lookback_days);
    let start = bars.partition_point(|b| b.date < cutoff);
    forecast::forecast_prices(symbol, &bars[start..], options.horizon_days, today)
}

/// Fetches only the forecast lookback window and extrapolates.
pub fn forecast_symbol(
    data_port: &dyn MarketDataPort,
    symbol: &str,
    options: &ForecastOptions,
    today: NaiveDate,
) -> Result<Forecast, StockpulseError> {
    let start = days_before(today, options.lookback_days);
    let bars = data_port.fetch_daily_bars(symbol, start, today)?;
    forecast::forecast_prices(symbol, &bars, options.horizon_days, today).ok_or_else(|| {
        StockpulseError::NoData {
            symbol: symbol.to_string(),
        }
    })
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub today: NaiveDate,
    pub lookback_days: i64,
    /// Directory for `{symbol}.svg` charts; `None` disables charting.
    pub chart_dir: Option<PathBuf>,
    pub forecast: Option<ForecastOptions>,
}

impl BatchOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            chart_dir: None,
            forecast: None,
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        days_before(self.today, self.lookback_days)
    }
}

#[derive(Debug, Clone)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub last_price: f64,
    pub signal: Signal,
    pub rows_written: usize,
    pub chart_path: Option<PathBuf>,
    pub forecast: Option<Forecast>,
    pub analysis: SymbolAnalysis,
}

#[derive(Debug, Clone)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub analyzed: Vec<SymbolOutcome>,
    pub skipped: Vec<SkippedSymbol>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.analyzed.len() + self.skipped.len()
    }
}

/// Per-symbol result handed to the progress callback of
/// [`run_batch_with_progress`] as soon as the symbol is done.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    Analyzed(&'a SymbolOutcome),
    Skipped(&'a SkippedSymbol),
}

pub fn run_batch(
    data_port: &dyn MarketDataPort,
    store: &dyn AnalysisStorePort,
    chart: Option<&dyn ChartPort>,
    symbols: &[String],
    options: &BatchOptions,
) -> BatchReport {
    run_batch_with_progress(data_port, store, chart, symbols, options, |_| {})
}

pub fn run_batch_with_progress(
    data_port: &dyn MarketDataPort,
    store: &dyn AnalysisStorePort,
    chart: Option<&dyn ChartPort>,
    symbols: &[String],
    options: &BatchOptions,
    mut on_progress: impl FnMut(Progress<'_>),
) -> BatchReport {
    let mut report = BatchReport::default();

    for symbol in symbols {
        match process_symbol(data_port, store, chart, symbol, options) {
            Ok(outcome) => {
                info!(
                    symbol = %outcome.symbol,
                    price = outcome.last_price,
                    recommendation = %outcome.signal.recommendation,
                    score = outcome.signal.score,
                    rows = outcome.rows_written,
                    "analysis complete"
                );
                on_progress(Progress::Analyzed(&outcome));
                report.analyzed.push(outcome);
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "skipping symbol");
                let skipped = SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: e.to_string(),
                };
                on_progress(Progress::Skipped(&skipped));
                report.skipped.push(skipped);
            }
        }
    }

    info!(
        analyzed = report.analyzed.len(),
        skipped = report.skipped.len(),
        "batch finished"
    );
    report
}

fn process_symbol(
    data_port: &dyn MarketDataPort,
    store: &dyn AnalysisStorePort,
    chart: Option<&dyn ChartPort>,
    symbol: &str,
    options: &BatchOptions,
) -> Result<SymbolOutcome, StockpulseError> {
    let analysis = analyze_symbol(data_port, symbol, options.start_date(), options.today)?;
    let last_price = analysis.last_price().ok_or_else(|| StockpulseError::NoData {
        symbol: symbol.to_string(),
    })?;

    let forecast = options
        .forecast
        .as_ref()
        .and_then(|f| forecast_from_bars(symbol, &analysis.bars, f, options.today));

    let chart_path = match (chart, options.chart_dir.as_ref()) {
        (Some(chart), Some(dir)) => {
            let path = dir.join(format!("{}.svg", symbol));
            chart.write_chart(&analysis, forecast.as_ref(), &path)?;
            Some(path)
        }
        _ => None,
    };

    let rows_written = store.append_records(&analysis.records)?;

    Ok(SymbolOutcome {
        symbol: symbol.to_string(),
        last_price,
        signal: analysis.signal,
        rows_written,
        chart_path,
        forecast,
        analysis,
    })
}
