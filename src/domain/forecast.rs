//! Linear trend forecast.
//!
//! Ordinary least squares of close against the day index 0..n, extrapolated
//! for a fixed number of days. No seasonality, volatility, or error bars.

use chrono::{Duration, NaiveDate};

use crate::domain::ohlcv::{DailyBar, closes};

pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;
pub const DEFAULT_HORIZON_DAYS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearTrend {
    /// Fits y = intercept + slope * x with x = 0, 1, .., n-1.
    /// Returns `None` for an empty series; a single value yields a flat line.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n == 0 {
            return None;
        }
        if n == 1 {
            return Some(Self {
                slope: 0.0,
                intercept: values[0],
            });
        }

        let n_f = n as f64;
        let mean_x = (n_f - 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / n_f;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxy += dx * (y - mean_y);
            sxx += dx * dx;
        }

        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone)]
pub struct Forecast {
    pub symbol: String,
    pub trend: LinearTrend,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// Price at the end of the horizon.
    pub fn final_price(&self) -> Option<f64> {
        self.points.last().map(|p| p.price)
    }
}

/// Extrapolates `horizon` days past the series, dated from `reference`
/// (the day the forecast is made) plus 1..=horizon calendar days.
pub fn forecast_prices(
    symbol: &str,
    bars: &[DailyBar],
    horizon: usize,
    reference: NaiveDate,
) -> Option<Forecast> {
    let values = closes(bars);
    let trend = LinearTrend::fit(&values)?;
    let n = values.len();

    let points = (0..horizon)
        .map_while(|step| {
            let date = reference.checked_add_signed(Duration::days(step as i64 + 1))?;
            Some(ForecastPoint {
                date,
                price: trend.predict((n + step) as f64),
            })
        })
        .collect();

    Some(Forecast {
        symbol: symbol.to_string(),
        trend,
        points,
    })
}
