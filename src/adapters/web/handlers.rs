//! HTTP request handlers for web adapter.

use askama::Template;
use axum::{
    Form,
    extract::{Path, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::analysis::{BatchOptions, BatchReport, run_batch};
use crate::domain::recommendation::MAX_SCORE;
use crate::domain::watchlist::{DASHBOARD_DEFAULT_SELECTION, DASHBOARD_WATCHLIST, normalize_symbol};

use super::templates::{
    BasePage, DashboardTemplate, HistoryRow, HistoryTemplate, ResultsTemplate, SymbolChoice,
};
use super::{AppState, WebError, is_htmx_request};

fn respond<T: Template>(headers: &HeaderMap, title: &str, template: &T) -> Result<Response, WebError> {
    let content = template.render()?;
    if is_htmx_request(headers) {
        return Ok(Html(content).into_response());
    }
    let page = BasePage {
        title,
        content: &content,
    }
    .render()?;
    Ok(Html(page).into_response())
}

pub async fn dashboard(headers: HeaderMap) -> Result<Response, WebError> {
    let choices = DASHBOARD_WATCHLIST
        .iter()
        .map(|s| SymbolChoice {
            symbol: s.to_string(),
            checked: DASHBOARD_DEFAULT_SELECTION.contains(s),
        })
        .collect();

    respond(&headers, "Dashboard", &DashboardTemplate { choices })
        .map_err(|e| e.for_request(&headers))
}

/// Symbols from repeated `symbols` form fields, normalised and deduplicated
/// in submission order.
pub fn selected_symbols(fields: &[(String, String)]) -> Result<Vec<String>, WebError> {
    let mut symbols: Vec<String> = Vec::new();
    for (key, value) in fields {
        if key != "symbols" || value.trim().is_empty() {
            continue;
        }
        let symbol = normalize_symbol(value).map_err(|e| WebError::bad_request(e.to_string()))?;
        if !symbols.contains(&symbol) {
            symbols.push(symbol);
        }
    }

    if symbols.is_empty() {
        return Err(WebError::bad_request("Select at least one symbol"));
    }
    Ok(symbols)
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Response, WebError> {
    run_analysis(state, &headers, &fields)
        .await
        .map_err(|e| e.for_request(&headers))
}

async fn run_analysis(
    state: Arc<AppState>,
    headers: &HeaderMap,
    fields: &[(String, String)],
) -> Result<Response, WebError> {
    let symbols = selected_symbols(fields)?;
    info!(symbols = ?symbols, "dashboard analysis requested");

    let worker = Arc::clone(&state);
    let (report, charts) = tokio::task::spawn_blocking(move || -> (BatchReport, Vec<String>) {
        let settings = &worker.settings;
        let mut options = BatchOptions::new(settings.today());
        options.lookback_days = settings.lookback_days;
        options.forecast = Some(settings.forecast.clone());

        let report = run_batch(&*worker.data_port, &*worker.store, None, &symbols, &options);
        let charts = report
            .analyzed
            .iter()
            .map(|outcome| {
                worker
                    .chart
                    .render(&outcome.analysis, outcome.forecast.as_ref())
                    .unwrap_or_else(|e| {
                        warn!(symbol = %outcome.symbol, error = %e, "chart rendering failed");
                        String::new()
                    })
            })
            .collect();
        (report, charts)
    })
    .await
    .map_err(|e| WebError::internal(format!("analysis task failed: {}", e)))?;

    let template = ResultsTemplate::from_report(&report, charts, MAX_SCORE);
    respond(headers, "Analysis results", &template)
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(symbol): Path<String>,
) -> Result<Response, WebError> {
    load_history(state, &headers, &symbol)
        .await
        .map_err(|e| e.for_request(&headers))
}

async fn load_history(
    state: Arc<AppState>,
    headers: &HeaderMap,
    symbol: &str,
) -> Result<Response, WebError> {
    let symbol = normalize_symbol(symbol).map_err(|e| WebError::bad_request(e.to_string()))?;
    let limit = state.settings.history_limit;

    let worker = Arc::clone(&state);
    let lookup = symbol.clone();
    let records = tokio::task::spawn_blocking(move || worker.store.latest_records(&lookup, limit))
        .await
        .map_err(|e| WebError::internal(format!("history task failed: {}", e)))??;

    let template = HistoryTemplate {
        rows: records.iter().map(HistoryRow::from).collect(),
        symbol,
    };
    respond(headers, "History", &template)
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn selected_symbols_keeps_order_and_dedupes() {
        let symbols = selected_symbols(&fields(&[
            ("symbols", "petr4.sa"),
            ("symbols", "AAPL"),
            ("other", "x"),
            ("symbols", "PETR4.SA"),
        ]))
        .unwrap();
        assert_eq!(symbols, vec!["PETR4.SA", "AAPL"]);
    }

    #[test]
    fn selected_symbols_requires_one() {
        let err = selected_symbols(&fields(&[("symbols", "  ")])).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn selected_symbols_rejects_invalid() {
        let err = selected_symbols(&fields(&[("symbols", "AA PL")])).unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
    }
}
