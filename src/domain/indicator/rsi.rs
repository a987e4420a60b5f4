//! RSI (Relative Strength Index).
//!
//! Average gain and average loss are simple rolling means over the last n
//! close-to-close changes:
//!
//! RS = avg_gain / avg_loss, RSI = 100 - (100 / (1 + RS))
//!
//! If avg_loss == 0 and avg_gain > 0 the ratio is infinite and RSI = 100.
//! If both are 0 (flat window) RSI is undefined and the point is invalid.
//!
//! Warmup: first n bars are invalid (need n price changes).

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::DailyBar;

pub fn calculate_rsi(bars: &[DailyBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.len() < 2 {
        let values = bars.iter().map(|b| IndicatorPoint::invalid(b.date)).collect();
        return IndicatorSeries {
            indicator_type: IndicatorType::Rsi(period),
            values,
        };
    }

    let mut gains: Vec<f64> = Vec::with_capacity(bars.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(bars.len() - 1);

    for pair in bars.windows(2) {
        let change = pair[1].close - pair[0].close;
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let mut values = Vec::with_capacity(bars.len());
    values.push(IndicatorPoint::invalid(bars[0].date));

    for (i, bar) in bars.iter().enumerate().skip(1) {
        // change index for this bar
        let idx = i - 1;
        if idx + 1 < period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        let start = idx + 1 - period;
        let avg_gain = gains[start..=idx].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[start..=idx].iter().sum::<f64>() / period as f64;

        values.push(match rsi_from_averages(avg_gain, avg_loss) {
            Some(rsi) => IndicatorPoint::valid(bar.date, rsi),
            None => IndicatorPoint::invalid(bar.date),
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { Some(100.0) } else { None };
    }
    Some(100.0 - (100.0 / (1.0 + avg_gain / avg_loss)))
}
