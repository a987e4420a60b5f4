//! HTML templates using Askama.
//!
//! Content templates render the fragment swapped in by HTMX; full page loads
//! wrap the same fragment in `BasePage`.

use askama::Template;

use crate::domain::analysis::{BatchReport, StoredRecord};

#[derive(Template)]
#[template(path = "base.html")]
pub struct BasePage<'a> {
    pub title: &'a str,
    pub content: &'a str,
}

pub struct SymbolChoice {
    pub symbol: String,
    pub checked: bool,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub choices: Vec<SymbolChoice>,
}

pub struct ResultRow {
    pub symbol: String,
    pub last_price: String,
    pub recommendation: String,
    pub score: u8,
    pub predicted_price: String,
    pub chart_svg: String,
}

pub struct WarningRow {
    pub symbol: String,
    pub reason: String,
}

#[derive(Template)]
#[template(path = "results.html")]
pub struct ResultsTemplate {
    pub rows: Vec<ResultRow>,
    pub warnings: Vec<WarningRow>,
    pub max_score: u8,
}

impl ResultsTemplate {
    /// Builds table rows from a batch report. `charts` holds one rendered
    /// chart per analysed symbol, in report order.
    pub fn from_report(report: &BatchReport, charts: Vec<String>, max_score: u8) -> Self {
        let rows = report
            .analyzed
            .iter()
            .zip(charts.into_iter().chain(std::iter::repeat(String::new())))
            .map(|(outcome, chart_svg)| ResultRow {
                symbol: outcome.symbol.clone(),
                last_price: format!("{:.2}", outcome.last_price),
                recommendation: outcome.signal.recommendation.to_string(),
                score: outcome.signal.score,
                predicted_price: outcome
                    .forecast
                    .as_ref()
                    .and_then(|f| f.final_price())
                    .map_or_else(|| "N/A".to_string(), |p| format!("{:.2}", p)),
                chart_svg,
            })
            .collect();

        let warnings = report
            .skipped
            .iter()
            .map(|s| WarningRow {
                symbol: s.symbol.clone(),
                reason: s.reason.clone(),
            })
            .collect();

        Self {
            rows,
            warnings,
            max_score,
        }
    }
}

pub struct HistoryRow {
    pub date: String,
    pub price: String,
    pub ma50: String,
    pub ma100: String,
    pub ma200: String,
    pub rsi: String,
    pub recommendation: String,
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

impl From<&StoredRecord> for HistoryRow {
    fn from(stored: &StoredRecord) -> Self {
        let r = &stored.record;
        Self {
            date: r.date.format("%Y-%m-%d").to_string(),
            price: format!("{:.2}", r.price),
            ma50: optional(r.ma50),
            ma100: optional(r.ma100),
            ma200: optional(r.ma200),
            rsi: optional(r.rsi),
            recommendation: r.recommendation.to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    pub symbol: String,
    pub rows: Vec<HistoryRow>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
    pub status: u16,
}
