//! Configuration validation.
//!
//! Validates config fields before a batch run or server start. Every key is
//! optional; only values that are present and out of range are rejected.

use crate::domain::error::StockpulseError;
use crate::domain::watchlist::parse_symbols;
use crate::ports::config_port::ConfigPort;

pub const DATA_SOURCES: &[&str] = &["yahoo", "csv"];
pub const MAX_HORIZON_DAYS: i64 = 365;
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;
pub const MAX_POOL_SIZE: i64 = 64;
pub const MAX_TIMEOUT_SECS: i64 = 600;
pub const MAX_HISTORY_LIMIT: i64 = 10_000;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    validate_symbols(config)?;
    validate_range(config, "analysis", "lookback_days", MAX_LOOKBACK_DAYS)?;
    validate_range(config, "forecast", "lookback_days", MAX_LOOKBACK_DAYS)?;
    validate_range(config, "forecast", "horizon_days", MAX_HORIZON_DAYS)?;
    validate_data_source(config)?;
    validate_range(config, "yahoo", "timeout_secs", MAX_TIMEOUT_SECS)?;
    validate_range(config, "sqlite", "pool_size", MAX_POOL_SIZE)?;
    validate_range(config, "web", "history_limit", MAX_HISTORY_LIMIT)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> StockpulseError {
    StockpulseError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_symbols(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    match config.get_string("analysis", "symbols") {
        Some(s) => parse_symbols(&s)
            .map(|_| ())
            .map_err(|e| invalid("analysis", "symbols", e.to_string())),
        None => Ok(()),
    }
}

/// Missing keys are fine; present keys must parse to an integer in `1..=max`.
fn validate_range(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    max: i64,
) -> Result<(), StockpulseError> {
    if config.get_string(section, key).is_none() {
        return Ok(());
    }
    let value = config.get_int(section, key, 0);
    if value <= 0 {
        return Err(invalid(section, key, format!("{} must be a positive integer", key)));
    }
    if value > max {
        return Err(invalid(section, key, format!("{} must be at most {}", key, max)));
    }
    Ok(())
}

fn validate_data_source(config: &dyn ConfigPort) -> Result<(), StockpulseError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "yahoo".to_string())
        .to_lowercase();

    if !DATA_SOURCES.contains(&source.as_str()) {
        return Err(invalid(
            "data",
            "source",
            format!("unknown data source '{}', expected one of {}", source, DATA_SOURCES.join(", ")),
        ));
    }

    if source == "csv" {
        match config.get_string("data", "csv_dir") {
            Some(dir) if !dir.trim().is_empty() => {}
            _ => {
                return Err(StockpulseError::ConfigMissing {
                    section: "data".to_string(),
                    key: "csv_dir".to_string(),
                });
            }
        }
    }
    Ok(())
}
