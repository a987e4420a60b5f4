//! Web dashboard adapter.
//!
//! Axum server with an HTMX-friendly frontend: pick symbols from the
//! dashboard watchlist, run the analysis pipeline on them and browse the
//! rows already stored for a symbol.

mod error;
mod handlers;
mod templates;

pub use error::WebError;
pub use handlers::*;
pub use templates::*;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::NaiveDate;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::domain::analysis::{DEFAULT_LOOKBACK_DAYS, ForecastOptions};
use crate::domain::error::StockpulseError;
use crate::ports::chart_port::ChartPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataPort;
use crate::ports::store_port::AnalysisStorePort;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";
pub const DEFAULT_HISTORY_LIMIT: usize = 30;

#[derive(Debug, Clone)]
pub struct WebSettings {
    pub lookback_days: i64,
    pub forecast: ForecastOptions,
    pub history_limit: usize,
    /// Fixed analysis date; `None` uses the local calendar date per request.
    pub as_of: Option<NaiveDate>,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            forecast: ForecastOptions::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            as_of: None,
        }
    }
}

impl WebSettings {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let defaults = ForecastOptions::default();
        Self {
            lookback_days: config.get_int("analysis", "lookback_days", DEFAULT_LOOKBACK_DAYS),
            forecast: ForecastOptions {
                lookback_days: config.get_int("forecast", "lookback_days", defaults.lookback_days),
                horizon_days: config
                    .get_int("forecast", "horizon_days", defaults.horizon_days as i64)
                    .max(1) as usize,
            },
            history_limit: config
                .get_int("web", "history_limit", DEFAULT_HISTORY_LIMIT as i64)
                .max(1) as usize,
            as_of: None,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

pub struct AppState {
    pub data_port: Arc<dyn MarketDataPort + Send + Sync>,
    pub store: Arc<dyn AnalysisStorePort + Send + Sync>,
    pub chart: Arc<dyn ChartPort + Send + Sync>,
    pub settings: WebSettings,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard))
        .route("/analyze", post(handlers::analyze))
        .route("/history/{symbol}", get(handlers::history))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub async fn serve(state: AppState, listen: &str) -> Result<(), StockpulseError> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen).await?;
    info!(address = listen, "web server listening");
    axum::serve(listener, router).await?;
    Ok(())
}

fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("HX-Request").is_some()
}
