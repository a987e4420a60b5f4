//! Technical indicator implementations.
//!
//! - `IndicatorPoint`: a single point in an indicator time series
//! - `IndicatorType`: indicator identity + parameters (serves as HashMap key)
//! - `IndicatorSeries`: a time series of indicator values aligned with the bars

pub mod rsi;
pub mod sma;

use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;

use crate::domain::ohlcv::DailyBar;

pub const MA_SHORT: usize = 50;
pub const MA_MEDIUM: usize = 100;
pub const MA_LONG: usize = 200;
pub const RSI_PERIOD: usize = 14;

/// Indicators computed for every analysis run.
pub const STANDARD_INDICATORS: [IndicatorType; 4] = [
    IndicatorType::Sma(MA_SHORT),
    IndicatorType::Sma(MA_MEDIUM),
    IndicatorType::Sma(MA_LONG),
    IndicatorType::Rsi(RSI_PERIOD),
];

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn invalid(date: NaiveDate) -> Self {
        Self {
            date,
            valid: false,
            value: 0.0,
        }
    }

    pub fn valid(date: NaiveDate, value: f64) -> Self {
        Self {
            date,
            valid: true,
            value,
        }
    }

    /// The value if the warmup window was filled and the formula was defined.
    pub fn get(&self) -> Option<f64> {
        self.valid.then_some(self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(IndicatorPoint::get)
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().and_then(IndicatorPoint::get)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
        }
    }
}

pub fn compute_indicator(bars: &[DailyBar], indicator: IndicatorType) -> IndicatorSeries {
    match indicator {
        IndicatorType::Sma(period) => sma::calculate_sma(bars, period),
        IndicatorType::Rsi(period) => rsi::calculate_rsi(bars, period),
    }
}

pub fn compute_indicators(
    bars: &[DailyBar],
    indicators: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorSeries> {
    indicators
        .iter()
        .map(|&ind| (ind, compute_indicator(bars, ind)))
        .collect()
}
