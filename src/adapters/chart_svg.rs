//! SVG line chart of closes, moving averages and the forecast line.

use crate::domain::analysis::{AnalysisRecord, SymbolAnalysis};
use crate::domain::error::StockpulseError;
use crate::domain::forecast::Forecast;
use crate::ports::chart_port::ChartPort;
use std::fmt::Write as _;

const WIDTH: f64 = 900.0;
const HEIGHT: f64 = 420.0;
const PAD_LEFT: f64 = 70.0;
const PAD_RIGHT: f64 = 20.0;
const PAD_TOP: f64 = 40.0;
const PAD_BOTTOM: f64 = 60.0;
const X_TICKS: usize = 5;

struct Series {
    label: &'static str,
    color: &'static str,
    dashed: bool,
    /// (x index, value) pairs; undefined points are left out.
    points: Vec<(usize, f64)>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SvgChartAdapter;

impl SvgChartAdapter {
    pub fn new() -> Self {
        Self
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn defined(
    records: &[AnalysisRecord],
    value: impl Fn(&AnalysisRecord) -> Option<f64>,
) -> Vec<(usize, f64)> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| value(r).map(|v| (i, v)))
        .collect()
}

fn collect_series(analysis: &SymbolAnalysis, forecast: Option<&Forecast>) -> Vec<Series> {
    let records = &analysis.records;

    let mut series = vec![
        Series {
            label: "Close",
            color: "#1f77b4",
            dashed: false,
            points: defined(records, |r| Some(r.price)),
        },
        Series {
            label: "MA50",
            color: "#ff7f0e",
            dashed: false,
            points: defined(records, |r| r.ma50),
        },
        Series {
            label: "MA100",
            color: "#2ca02c",
            dashed: false,
            points: defined(records, |r| r.ma100),
        },
        Series {
            label: "MA200",
            color: "#9467bd",
            dashed: false,
            points: defined(records, |r| r.ma200),
        },
    ];

    if let Some(forecast) = forecast.filter(|f| !f.points.is_empty()) {
        let start = records.len();
        // joined to the last close so the line continues from the price series
        let mut points: Vec<(usize, f64)> = records
            .last()
            .map(|r| (start - 1, r.price))
            .into_iter()
            .collect();
        points.extend(forecast.points.iter().enumerate().map(|(i, p)| (start + i, p.price)));
        series.push(Series {
            label: "Forecast",
            color: "#d62728",
            dashed: true,
            points,
        });
    }

    series
}

/// Renders the chart as a standalone SVG document.
pub fn render_svg(analysis: &SymbolAnalysis, forecast: Option<&Forecast>) -> String {
    let series = collect_series(analysis, forecast);
    let horizon = forecast.map_or(0, |f| f.points.len());
    let total_x = analysis.records.len() + horizon;

    let (mut min_y, mut max_y) = series
        .iter()
        .flat_map(|s| s.points.iter().map(|&(_, v)| v))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min_y.is_finite() {
        min_y = 0.0;
        max_y = 1.0;
    }
    if max_y - min_y <= f64::EPSILON {
        min_y -= 1.0;
        max_y += 1.0;
    }

    let plot_width = WIDTH - PAD_LEFT - PAD_RIGHT;
    let plot_height = HEIGHT - PAD_TOP - PAD_BOTTOM;
    let scale_x = if total_x > 1 {
        plot_width / (total_x - 1) as f64
    } else {
        0.0
    };
    let scale_y = plot_height / (max_y - min_y);
    let x_at = |i: usize| PAD_LEFT + i as f64 * scale_x;
    let y_at = |v: f64| HEIGHT - PAD_BOTTOM - (v - min_y) * scale_y;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="11">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="22" text-anchor="middle" font-size="15">Stock analysis - {}</text>"#,
        WIDTH / 2.0,
        escape(&analysis.symbol)
    );

    // axes
    let _ = writeln!(
        svg,
        r##"<line x1="{l}" y1="{t}" x2="{l}" y2="{b}" stroke="#444"/><line x1="{l}" y1="{b}" x2="{r}" y2="{b}" stroke="#444"/>"##,
        l = PAD_LEFT,
        t = PAD_TOP,
        b = HEIGHT - PAD_BOTTOM,
        r = WIDTH - PAD_RIGHT
    );

    for value in [min_y, (min_y + max_y) / 2.0, max_y] {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.1}" text-anchor="end">{:.2}</text>"#,
            PAD_LEFT - 6.0,
            y_at(value) + 4.0,
            value
        );
    }

    for (i, date) in tick_dates(analysis, forecast, total_x) {
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{}" text-anchor="middle">{}</text>"#,
            x_at(i),
            HEIGHT - PAD_BOTTOM + 16.0,
            date
        );
    }
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle">Date</text>"#,
        PAD_LEFT + plot_width / 2.0,
        HEIGHT - 12.0
    );
    let _ = writeln!(
        svg,
        r#"<text x="16" y="{y}" text-anchor="middle" transform="rotate(-90 16 {y})">Price</text>"#,
        y = PAD_TOP + plot_height / 2.0
    );

    for s in series.iter().filter(|s| !s.points.is_empty()) {
        let points: Vec<String> = s
            .points
            .iter()
            .map(|&(i, v)| format!("{:.1},{:.1}", x_at(i), y_at(v)))
            .collect();
        let dash = if s.dashed { r#" stroke-dasharray="6 4""# } else { "" };
        let _ = writeln!(
            svg,
            r#"<polyline fill="none" stroke="{}" stroke-width="1.5"{} points="{}"/>"#,
            s.color,
            dash,
            points.join(" ")
        );
    }

    for (row, s) in series.iter().enumerate() {
        let y = PAD_TOP + 6.0 + row as f64 * 16.0;
        let x = PAD_LEFT + 10.0;
        let _ = writeln!(
            svg,
            r#"<line x1="{x}" y1="{y}" x2="{}" y2="{y}" stroke="{}" stroke-width="2"/><text x="{}" y="{:.1}">{}</text>"#,
            x + 18.0,
            s.color,
            x + 24.0,
            y + 4.0,
            s.label
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Evenly spaced date labels across bars and forecast points.
fn tick_dates(
    analysis: &SymbolAnalysis,
    forecast: Option<&Forecast>,
    total_x: usize,
) -> Vec<(usize, String)> {
    let date_at = |i: usize| {
        let n = analysis.records.len();
        if i < n {
            Some(analysis.records[i].date)
        } else {
            forecast.and_then(|f| f.points.get(i - n)).map(|p| p.date)
        }
    };

    if total_x == 0 {
        return Vec::new();
    }
    let ticks = X_TICKS.min(total_x);
    let mut out: Vec<(usize, String)> = Vec::new();
    for t in 0..ticks {
        let i = if ticks == 1 { 0 } else { t * (total_x - 1) / (ticks - 1) };
        if out.last().is_some_and(|(prev, _)| *prev == i) {
            continue;
        }
        if let Some(date) = date_at(i) {
            out.push((i, date.format("%Y-%m-%d").to_string()));
        }
    }
    out
}

impl ChartPort for SvgChartAdapter {
    fn render(
        &self,
        analysis: &SymbolAnalysis,
        forecast: Option<&Forecast>,
    ) -> Result<String, StockpulseError> {
        if analysis.records.is_empty() {
            return Err(StockpulseError::Chart {
                reason: format!("nothing to plot for {}", analysis.symbol),
            });
        }
        Ok(render_svg(analysis, forecast))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::analysis::analyze_bars;
    use crate::domain::forecast::forecast_prices;
    use crate::domain::ohlcv::DailyBar;
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    fn analysis(symbol: &str, count: usize) -> SymbolAnalysis {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = (0..count)
            .map(|i| DailyBar::flat(symbol, start + Duration::days(i as i64), 50.0 + i as f64))
            .collect();
        analyze_bars(symbol, bars).unwrap()
    }

    #[test]
    fn svg_has_title_legend_and_axes() {
        let a = analysis("PETR4.SA", 220);
        let svg = render_svg(&a, None);

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Stock analysis - PETR4.SA"));
        for label in ["Close", "MA50", "MA100", "MA200", "Date", "Price"] {
            assert!(svg.contains(label), "missing {label}");
        }
        assert!(svg.contains("2024-01-01"));
        assert_eq!(svg.matches("<polyline").count(), 4);
        assert!(!svg.contains("Forecast"));
    }

    #[test]
    fn short_series_omits_undefined_averages() {
        let a = analysis("AAPL", 60);
        let svg = render_svg(&a, None);
        // close and MA50 only
        assert_eq!(svg.matches("<polyline").count(), 2);
    }

    #[test]
    fn forecast_line_is_dashed() {
        let a = analysis("BTC-USD", 30);
        let last = a.last_date().unwrap();
        let f = forecast_prices("BTC-USD", &a.bars, 7, last).unwrap();
        let svg = render_svg(&a, Some(&f));

        assert!(svg.contains("Forecast"));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains(&(last + Duration::days(7)).format("%Y-%m-%d").to_string()));
    }

    #[test]
    fn single_bar_renders() {
        let a = analysis("X", 1);
        let svg = render_svg(&a, None);
        assert!(svg.contains("<polyline"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn write_chart_creates_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("charts").join("AAPL.svg");
        let a = analysis("AAPL", 10);

        SvgChartAdapter::new().write_chart(&a, None, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Stock analysis - AAPL"));
    }

    #[test]
    fn empty_analysis_is_chart_error() {
        let mut a = analysis("AAPL", 3);
        a.records.clear();
        let err = SvgChartAdapter::new().render(&a, None).unwrap_err();
        assert!(matches!(err, StockpulseError::Chart { .. }));
    }
}
