//! Integration tests for the analysis pipeline.
//!
//! Tests cover:
//! - Batch run against the SQLite store with a mock data port
//! - Skip-and-continue on provider errors and empty series
//! - Append-only storage across repeated runs
//! - CSV data source with SVG chart output
//! - Forecast over the lookback window

mod common;

use approx::assert_relative_eq;
use chrono::Duration;
use common::*;
use stockpulse::adapters::chart_svg::SvgChartAdapter;
use stockpulse::adapters::csv_adapter::CsvAdapter;
use stockpulse::adapters::sqlite_adapter::SqliteAdapter;
use stockpulse::domain::analysis::{
    BatchOptions, ForecastOptions, analyze_symbol, forecast_symbol, run_batch,
};
use stockpulse::domain::error::StockpulseError;
use stockpulse::domain::recommendation::Recommendation;
use stockpulse::ports::store_port::AnalysisStorePort;
use tempfile::TempDir;

fn store() -> SqliteAdapter {
    let store = SqliteAdapter::in_memory().unwrap();
    store.initialize_schema().unwrap();
    store
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

mod batch_pipeline {
    use super::*;

    #[test_log::test]
    fn rising_and_falling_series_are_scored_and_stored() {
        let today = date(2025, 3, 31);
        let falling: Vec<DailyBar> = bars_ending("BTC-USD", today, 250, 0.0)
            .into_iter()
            .map(|mut b| {
                b.close = 500.0 - b.close;
                b
            })
            .collect();
        let port = MockDataPort::new()
            .with_bars("AAPL", bars_ending("AAPL", today, 250, 100.0))
            .with_bars("BTC-USD", falling);
        let store = store();

        let report = run_batch(
            &port,
            &store,
            None,
            &symbols(&["AAPL", "BTC-USD"]),
            &BatchOptions::new(today),
        );

        assert_eq!(report.analyzed.len(), 2);
        assert!(report.skipped.is_empty());

        let aapl = &report.analyzed[0];
        assert_eq!(aapl.signal.recommendation, Recommendation::Buy);
        assert_eq!(aapl.signal.score, 3);
        assert_relative_eq!(aapl.last_price, 349.0);

        let btc = &report.analyzed[1];
        assert_eq!(btc.signal.recommendation, Recommendation::Avoid);
        assert_eq!(btc.signal.score, 1);
        assert!(btc.signal.conditions.rsi_oversold);

        assert_eq!(store.count_records("AAPL").unwrap(), 250);
        let latest = &store.latest_records("AAPL", 1).unwrap()[0].record;
        assert_eq!(latest.date, today);
        assert_relative_eq!(latest.ma50.unwrap(), 324.5);
        assert_relative_eq!(latest.ma100.unwrap(), 299.5);
        assert_relative_eq!(latest.ma200.unwrap(), 249.5);
        assert_relative_eq!(latest.rsi.unwrap(), 100.0);
        assert_eq!(latest.recommendation, Recommendation::Buy);
    }

    #[test_log::test]
    fn failures_are_skipped_and_the_loop_continues() {
        let today = date(2025, 3, 31);
        let port = MockDataPort::new()
            .with_error("PETR4.SA", "connection reset")
            .with_bars("DELISTED", vec![])
            .with_bars("MSFT", bars_ending("MSFT", today, 30, 400.0));
        let store = store();

        let report = run_batch(
            &port,
            &store,
            None,
            &symbols(&["PETR4.SA", "DELISTED", "MSFT"]),
            &BatchOptions::new(today),
        );

        assert_eq!(report.total(), 3);
        assert_eq!(report.analyzed.len(), 1);
        assert_eq!(report.analyzed[0].symbol, "MSFT");
        let skipped: Vec<&str> = report.skipped.iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(skipped, vec!["PETR4.SA", "DELISTED"]);
        assert!(report.skipped[0].reason.contains("connection reset"));
        assert_eq!(store.list_symbols().unwrap(), vec!["MSFT"]);
    }

    #[test]
    fn repeated_runs_append_duplicate_rows() {
        let today = date(2025, 3, 31);
        let port = MockDataPort::new().with_bars("VALE3.SA", bars_ending("VALE3.SA", today, 15, 60.0));
        let store = store();
        let options = BatchOptions::new(today);
        let list = symbols(&["VALE3.SA"]);

        run_batch(&port, &store, None, &list, &options);
        run_batch(&port, &store, None, &list, &options);

        assert_eq!(store.count_records("VALE3.SA").unwrap(), 30);
        let latest = store.latest_records("VALE3.SA", 2).unwrap();
        assert_eq!(latest[0].record, latest[1].record);
    }

    #[test]
    fn lookback_limits_fetched_history() {
        let today = date(2025, 3, 31);
        let port = MockDataPort::new().with_bars("AAPL", bars_ending("AAPL", today, 2000, 10.0));
        let mut options = BatchOptions::new(today);
        options.lookback_days = 99;

        let analysis = analyze_symbol(&port, "AAPL", options.start_date(), today).unwrap();
        assert_eq!(analysis.bars.len(), 100);
        assert!(analysis.records.last().unwrap().ma100.is_some());
        assert!(analysis.records.last().unwrap().ma200.is_none());
    }
}

mod csv_and_charts {
    use super::*;

    #[test]
    fn csv_source_writes_charts_and_rows() {
        let data_dir = TempDir::new().unwrap();
        let chart_dir = TempDir::new().unwrap();
        let today = date(2025, 1, 10);
        write_csv(data_dir.path(), "PETR4.SA", &bars_ending("PETR4.SA", today, 220, 30.0));

        let port = CsvAdapter::new(data_dir.path().to_path_buf());
        let store = store();
        let chart = SvgChartAdapter::new();
        let mut options = BatchOptions::new(today);
        options.chart_dir = Some(chart_dir.path().to_path_buf());
        options.forecast = Some(ForecastOptions::default());

        let report = run_batch(&port, &store, Some(&chart), &symbols(&["PETR4.SA", "NOPE"]), &options);

        assert_eq!(report.analyzed.len(), 1);
        assert_eq!(report.skipped[0].symbol, "NOPE");

        let outcome = &report.analyzed[0];
        let path = outcome.chart_path.as_ref().unwrap();
        assert_eq!(path, &chart_dir.path().join("PETR4.SA.svg"));
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.contains("Stock analysis - PETR4.SA"));
        assert!(svg.contains("Forecast"));

        assert_eq!(store.count_records("PETR4.SA").unwrap(), 220);
    }
}

mod forecasting {
    use super::*;

    #[test]
    fn forecast_symbol_extends_linear_trend() {
        let today = date(2025, 3, 31);
        let port = MockDataPort::new().with_bars("AAPL", bars_ending("AAPL", today, 1000, 1.0));
        let options = ForecastOptions {
            lookback_days: 365,
            horizon_days: 7,
        };

        let forecast = forecast_symbol(&port, "AAPL", &options, today).unwrap();

        assert_eq!(forecast.points.len(), 7);
        assert_relative_eq!(forecast.trend.slope, 1.0, epsilon = 1e-9);
        assert_eq!(forecast.points[0].date, today + Duration::days(1));
        assert_eq!(forecast.points[6].date, today + Duration::days(7));
        // last close is 1000.0, one step per day
        assert_relative_eq!(forecast.final_price().unwrap(), 1007.0, epsilon = 1e-6);
    }

    #[test]
    fn forecast_without_bars_is_no_data() {
        let port = MockDataPort::new().with_bars("EMPTY", vec![]);
        let err = forecast_symbol(&port, "EMPTY", &ForecastOptions::default(), date(2025, 1, 1))
            .unwrap_err();
        assert!(matches!(err, StockpulseError::NoData { .. }));
    }
}
