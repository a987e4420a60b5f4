//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::chart_svg::SvgChartAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sqlite_adapter::{DEFAULT_DB_PATH, SqliteAdapter};
use crate::adapters::yahoo_adapter::YahooFinanceAdapter;
use crate::domain::analysis::{
    self, BatchOptions, DEFAULT_LOOKBACK_DAYS, ForecastOptions, Progress, run_batch_with_progress,
};
use crate::domain::config_validation::{MAX_HORIZON_DAYS, validate_config};
use crate::domain::error::StockpulseError;
use crate::domain::recommendation::MAX_SCORE;
use crate::domain::watchlist::{default_watchlist, normalize_symbol, parse_symbols};
use crate::ports::chart_port::ChartPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::store_port::AnalysisStorePort;

pub const DEFAULT_CHART_DIR: &str = "charts";
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Parser, Debug)]
#[command(
    name = "stockpulse",
    version,
    about = "Technical analysis of daily stock and crypto prices"
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyse symbols, store the results and draw charts
    Analyze {
        /// Comma-separated symbols; overrides the config and the built-in watchlist
        #[arg(long)]
        symbols: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Skip chart rendering
        #[arg(long)]
        no_chart: bool,
        /// Add a linear trend forecast for each symbol
        #[arg(long)]
        forecast: bool,
        /// Directory for SVG charts
        #[arg(long)]
        chart_dir: Option<PathBuf>,
    },
    /// Forecast the next days for one symbol
    Forecast {
        #[arg(long)]
        symbol: String,
        /// Number of days to forecast
        #[arg(long, value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_HORIZON_DAYS as u64))]
        days: Option<usize>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show the latest stored rows for a symbol
    History {
        #[arg(long)]
        symbol: String,
        #[arg(
            long,
            default_value_t = DEFAULT_HISTORY_LIMIT,
            value_parser = RangedU64ValueParser::<usize>::new().range(1..)
        )]
        limit: usize,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Create the analysis table if it does not exist
    InitDb {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the built-in watchlist
    Watchlist,
    /// Start the web dashboard
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            symbols,
            config,
            no_chart,
            forecast,
            chart_dir,
        } => run_analyze(
            symbols.as_deref(),
            config.as_ref(),
            no_chart,
            forecast,
            chart_dir,
        ),
        Command::Forecast {
            symbol,
            days,
            config,
        } => run_forecast(&symbol, days, config.as_ref()),
        Command::History {
            symbol,
            limit,
            config,
        } => run_history(&symbol, limit, config.as_ref()),
        Command::InitDb { config } => run_init_db(config.as_ref()),
        Command::Watchlist => run_watchlist(),
        Command::Serve { config } => run_serve(config.as_ref()),
    }
}

fn fail(err: &StockpulseError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

/// Loads and validates the config file. No path means every key takes its
/// default.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path).map_err(|e| {
                fail(&StockpulseError::ConfigParse {
                    file: path.display().to_string(),
                    reason: e.to_string(),
                })
            })?
        }
        None => FileConfigAdapter::empty(),
    };

    validate_config(&adapter).map_err(|e| fail(&e))?;
    Ok(adapter)
}

/// Selects the market data source from `[data] source`.
pub fn build_data_port(
    config: &dyn ConfigPort,
) -> Result<Box<dyn MarketDataPort + Send + Sync>, StockpulseError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "yahoo".to_string())
        .to_lowercase();

    match source.as_str() {
        "csv" => {
            let dir = config
                .get_string("data", "csv_dir")
                .ok_or_else(|| StockpulseError::ConfigMissing {
                    section: "data".into(),
                    key: "csv_dir".into(),
                })?;
            Ok(Box::new(CsvAdapter::new(PathBuf::from(dir))))
        }
        "yahoo" => Ok(Box::new(YahooFinanceAdapter::from_config(config)?)),
        other => Err(StockpulseError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown data source '{}'", other),
        }),
    }
}

pub fn build_store(config: &dyn ConfigPort) -> Result<SqliteAdapter, StockpulseError> {
    let store = SqliteAdapter::from_config(config)?;
    store.initialize_schema()?;
    Ok(store)
}

/// `--symbols` wins over `[analysis] symbols`, which wins over the built-in
/// watchlist.
pub fn resolve_symbols(
    symbols_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, StockpulseError> {
    let invalid = |key: &str, reason: String| StockpulseError::ConfigInvalid {
        section: "analysis".into(),
        key: key.into(),
        reason,
    };

    if let Some(list) = symbols_override {
        return parse_symbols(list).map_err(|e| invalid("symbols", e.to_string()));
    }
    if let Some(list) = config.get_string("analysis", "symbols") {
        return parse_symbols(&list).map_err(|e| invalid("symbols", e.to_string()));
    }
    Ok(default_watchlist())
}

pub fn build_forecast_options(config: &dyn ConfigPort) -> ForecastOptions {
    let defaults = ForecastOptions::default();
    ForecastOptions {
        lookback_days: config.get_int("forecast", "lookback_days", defaults.lookback_days),
        horizon_days: config
            .get_int("forecast", "horizon_days", defaults.horizon_days as i64)
            .max(1) as usize,
    }
}

pub fn build_batch_options(
    config: &dyn ConfigPort,
    today: NaiveDate,
    no_chart: bool,
    forecast: bool,
    chart_dir: Option<PathBuf>,
) -> BatchOptions {
    let mut options = BatchOptions::new(today);
    options.lookback_days = config.get_int("analysis", "lookback_days", DEFAULT_LOOKBACK_DAYS);

    let chart_enabled = !no_chart && config.get_bool("analysis", "chart", true);
    options.chart_dir = chart_enabled.then(|| {
        chart_dir.unwrap_or_else(|| {
            PathBuf::from(
                config
                    .get_string("analysis", "chart_dir")
                    .unwrap_or_else(|| DEFAULT_CHART_DIR.to_string()),
            )
        })
    });

    if forecast || config.get_bool("forecast", "enabled", false) {
        options.forecast = Some(build_forecast_options(config));
    }
    options
}

fn run_analyze(
    symbols_override: Option<&str>,
    config_path: Option<&PathBuf>,
    no_chart: bool,
    forecast: bool,
    chart_dir: Option<PathBuf>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let symbols = match resolve_symbols(symbols_override, &config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let data_port = match build_data_port(&config) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let store = match build_store(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let today = chrono::Local::now().date_naive();
    let options = build_batch_options(&config, today, no_chart, forecast, chart_dir);
    let chart = SvgChartAdapter::new();

    run_analyze_pipeline(data_port.as_ref(), &store, &chart, &symbols, &options)
}

/// Runs the batch and prints one summary line per symbol. Fails only when no
/// symbol could be analysed.
pub fn run_analyze_pipeline(
    data_port: &dyn MarketDataPort,
    store: &dyn AnalysisStorePort,
    chart: &dyn ChartPort,
    symbols: &[String],
    options: &BatchOptions,
) -> ExitCode {
    eprintln!("Analysing {} symbols...", symbols.len());
    let report = run_batch_with_progress(
        data_port,
        store,
        Some(chart),
        symbols,
        options,
        print_progress,
    );
    eprintln!(
        "\n{} analysed, {} skipped",
        report.analyzed.len(),
        report.skipped.len()
    );

    if report.analyzed.is_empty() && !symbols.is_empty() {
        eprintln!("error: no symbol could be analysed");
        return ExitCode::from(5);
    }
    ExitCode::SUCCESS
}

pub fn summary_line(outcome: &analysis::SymbolOutcome) -> String {
    format!(
        "{}: last price {:.2} | {} (score {}/{})",
        outcome.symbol,
        outcome.last_price,
        outcome.signal.recommendation,
        outcome.signal.score,
        MAX_SCORE
    )
}

fn print_progress(progress: Progress<'_>) {
    match progress {
        Progress::Analyzed(outcome) => {
            println!("{}", summary_line(outcome));
            if let Some(forecast) = &outcome.forecast {
                if let Some(price) = forecast.final_price() {
                    println!("  forecast in {} days: {:.2}", forecast.points.len(), price);
                }
            }
            if let Some(path) = &outcome.chart_path {
                println!("  chart: {}", path.display());
            }
        }
        Progress::Skipped(skipped) => {
            eprintln!("warning: skipped {} ({})", skipped.symbol, skipped.reason);
        }
    }
}

fn run_forecast(symbol: &str, days: Option<usize>, config_path: Option<&PathBuf>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let symbol = match normalize_symbol(symbol) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    let mut options = build_forecast_options(&config);
    if let Some(days) = days {
        options.horizon_days = days;
    }

    let data_port = match build_data_port(&config) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };

    let today = chrono::Local::now().date_naive();
    let forecast = match analysis::forecast_symbol(data_port.as_ref(), &symbol, &options, today) {
        Ok(f) => f,
        Err(e) => return fail(&e),
    };

    println!(
        "{}: trend slope {:+.4} per day over the last {} days",
        forecast.symbol, forecast.trend.slope, options.lookback_days
    );
    for point in &forecast.points {
        println!("{}  {:.2}", point.date, point.price);
    }
    ExitCode::SUCCESS
}

fn run_history(symbol: &str, limit: usize, config_path: Option<&PathBuf>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let symbol = match normalize_symbol(symbol) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };

    let store = match build_store(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let rows = match store.latest_records(&symbol, limit) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    if rows.is_empty() {
        eprintln!("No stored analysis for {}", symbol);
        return ExitCode::SUCCESS;
    }

    let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
    println!(
        "{:<12}{:>12}{:>12}{:>12}{:>12}{:>8}  RECOMMENDATION",
        "DATE", "PRICE", "MA50", "MA100", "MA200", "RSI"
    );
    for row in &rows {
        let r = &row.record;
        println!(
            "{:<12}{:>12.2}{:>12}{:>12}{:>12}{:>8}  {}",
            r.date.to_string(),
            r.price,
            fmt(r.ma50),
            fmt(r.ma100),
            fmt(r.ma200),
            fmt(r.rsi),
            r.recommendation
        );
    }
    ExitCode::SUCCESS
}

fn run_init_db(config_path: Option<&PathBuf>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    match build_store(&config) {
        Ok(_) => {
            let path = config
                .get_string("sqlite", "path")
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
            eprintln!("Analysis table ready in {}", path);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_watchlist() -> ExitCode {
    for symbol in default_watchlist() {
        println!("{}", symbol);
    }
    ExitCode::SUCCESS
}

fn run_serve(config_path: Option<&PathBuf>) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, DEFAULT_LISTEN, WebSettings, serve};
        use std::sync::Arc;

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(code) => return code,
        };

        let data_port = match build_data_port(&config) {
            Ok(d) => Arc::from(d),
            Err(e) => return fail(&e),
        };
        let store = match build_store(&config) {
            Ok(s) => Arc::new(s),
            Err(e) => return fail(&e),
        };

        let listen = config
            .get_string("web", "listen")
            .unwrap_or_else(|| DEFAULT_LISTEN.to_string());

        let state = AppState {
            data_port,
            store,
            chart: Arc::new(SvgChartAdapter::new()),
            settings: WebSettings::from_config(&config),
        };

        eprintln!("Starting web server on {}", listen);

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => return fail(&StockpulseError::Io(e)),
        };
        match runtime.block_on(serve(state, &listen)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&e),
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}
