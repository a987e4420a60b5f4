//! Chart rendering port trait.

use crate::domain::analysis::SymbolAnalysis;
use crate::domain::error::StockpulseError;
use crate::domain::forecast::Forecast;
use std::path::Path;

pub trait ChartPort {
    /// Renders the chart document for one analysed symbol.
    fn render(
        &self,
        analysis: &SymbolAnalysis,
        forecast: Option<&Forecast>,
    ) -> Result<String, StockpulseError>;

    /// Renders and writes the chart to `output_path`, creating parent
    /// directories as needed.
    fn write_chart(
        &self,
        analysis: &SymbolAnalysis,
        forecast: Option<&Forecast>,
        output_path: &Path,
    ) -> Result<(), StockpulseError> {
        let document = self.render(analysis, forecast)?;
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(output_path, document)?;
        Ok(())
    }
}
