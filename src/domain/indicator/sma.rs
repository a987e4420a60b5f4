//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(C[i-j] for j in 0..n) / n
//! Warmup: first (n-1) bars are invalid.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::DailyBar;

pub fn calculate_sma(bars: &[DailyBar], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());

    if period == 0 {
        values.extend(bars.iter().map(|b| IndicatorPoint::invalid(b.date)));
        return IndicatorSeries {
            indicator_type: IndicatorType::Sma(period),
            values,
        };
    }

    for (i, bar) in bars.iter().enumerate() {
        if i + 1 < period {
            values.push(IndicatorPoint::invalid(bar.date));
            continue;
        }

        let window = &bars[i + 1 - period..=i];
        let mean = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
        values.push(IndicatorPoint::valid(bar.date, mean));
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Sma(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn make_bars(prices: &[f64]) -> Vec<DailyBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| DailyBar::flat("TEST", start + chrono::Duration::days(i as i64), close))
            .collect()
    }

    #[test]
    fn sma_empty_bars() {
        let series = calculate_sma(&[], 50);
        assert!(series.values.is_empty());
    }

    #[test]
    fn sma_warmup_period() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let series = calculate_sma(&bars, 3);

        assert!(!series.values[0].valid);
        assert!(!series.values[1].valid);
        assert!(series.values[2].valid);
        assert!(series.values[4].valid);
    }

    #[test]
    fn sma_hand_computed_window() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let series = calculate_sma(&bars, 3);

        assert_relative_eq!(series.value_at(2).unwrap(), 11.0);
        assert_relative_eq!(series.value_at(3).unwrap(), 12.0);
        assert_relative_eq!(series.value_at(4).unwrap(), 13.0);
    }

    #[test]
    fn sma_fewer_bars_than_period() {
        let bars = make_bars(&[10.0; 49]);
        let series = calculate_sma(&bars, 50);
        assert_eq!(series.values.len(), 49);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn sma_zero_period() {
        let bars = make_bars(&[10.0, 11.0]);
        let series = calculate_sma(&bars, 0);
        assert!(series.values.iter().all(|p| !p.valid));
    }

    #[test]
    fn sma_period_one_equals_close() {
        let bars = make_bars(&[3.0, 7.0, 5.0]);
        let series = calculate_sma(&bars, 1);
        for (bar, point) in bars.iter().zip(&series.values) {
            assert_relative_eq!(point.value, bar.close);
        }
    }

    #[test]
    fn sma_dates_align_with_bars() {
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let series = calculate_sma(&bars, 2);
        for (bar, point) in bars.iter().zip(&series.values) {
            assert_eq!(bar.date, point.date);
        }
    }

    proptest! {
        #[test]
        fn sma_stays_within_window_bounds(
            prices in proptest::collection::vec(1.0f64..1000.0, 1..120),
            period in 1usize..30,
        ) {
            let bars = make_bars(&prices);
            let series = calculate_sma(&bars, period);
            for (i, point) in series.values.iter().enumerate() {
                if let Some(v) = point.get() {
                    let window = &prices[i + 1 - period..=i];
                    let lo = window.iter().cloned().fold(f64::INFINITY, f64::min);
                    let hi = window.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                    prop_assert!(v >= lo - 1e-6 && v <= hi + 1e-6);
                }
            }
        }
    }
}
