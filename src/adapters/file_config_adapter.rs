//! INI file configuration adapter.
//!
//! ```ini
//! [analysis]
//! symbols = PETR4.SA, AAPL, BTC-USD
//! lookback_days = 1500
//! chart = true
//! chart_dir = charts
//!
//! [forecast]
//! enabled = false
//! lookback_days = 365
//! horizon_days = 7
//!
//! [data]
//! source = yahoo
//!
//! [sqlite]
//! path = stock_analysis.db
//! ```

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// Config with no sections; every lookup returns its default.
    pub fn empty() -> Self {
        Self { config: Ini::new() }
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .filter(|v| !v.trim().is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_sections() {
        let content = r#"
[analysis]
symbols = PETR4.SA, AAPL
lookback_days = 1500

[sqlite]
path = /tmp/stock_analysis.db
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("analysis", "symbols"),
            Some("PETR4.SA, AAPL".to_string())
        );
        assert_eq!(adapter.get_int("analysis", "lookback_days", 0), 1500);
        assert_eq!(
            adapter.get_string("sqlite", "path"),
            Some("/tmp/stock_analysis.db".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_or_blank() {
        let adapter = FileConfigAdapter::from_string("[analysis]\nsymbols =\n").unwrap();
        assert_eq!(adapter.get_string("analysis", "symbols"), None);
        assert_eq!(adapter.get_string("analysis", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_missing_or_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[forecast]\nhorizon_days = week\n").unwrap();
        assert_eq!(adapter.get_int("forecast", "horizon_days", 7), 7);
        assert_eq!(adapter.get_int("forecast", "lookback_days", 365), 365);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[analysis]\na = true\nb = yes\nc = 1\nd = off\ne = no\nf = 0\ng = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("analysis", "a", false));
        assert!(adapter.get_bool("analysis", "b", false));
        assert!(adapter.get_bool("analysis", "c", false));
        assert!(!adapter.get_bool("analysis", "d", true));
        assert!(!adapter.get_bool("analysis", "e", true));
        assert!(!adapter.get_bool("analysis", "f", true));
        assert!(adapter.get_bool("analysis", "g", true));
    }

    #[test]
    fn empty_adapter_returns_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("sqlite", "path"), None);
        assert_eq!(adapter.get_int("analysis", "lookback_days", 1500), 1500);
        assert!(adapter.get_bool("analysis", "chart", true));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[data]\nsource = csv\ncsv_dir = /srv/prices\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_string("data", "source"), Some("csv".to_string()));
        assert_eq!(
            adapter.get_string("data", "csv_dir"),
            Some("/srv/prices".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/stockpulse.ini");
        assert!(result.is_err());
    }
}
