//! Domain error types.

/// Top-level error type for stockpulse.
#[derive(Debug, thiserror::Error)]
pub enum StockpulseError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("provider error for {symbol}: {reason}")]
    Provider { symbol: String, reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("chart error: {reason}")]
    Chart { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&StockpulseError> for std::process::ExitCode {
    fn from(err: &StockpulseError) -> Self {
        let code: u8 = match err {
            StockpulseError::Io(_) | StockpulseError::Chart { .. } => 1,
            StockpulseError::ConfigParse { .. }
            | StockpulseError::ConfigMissing { .. }
            | StockpulseError::ConfigInvalid { .. } => 2,
            StockpulseError::Database { .. } | StockpulseError::DatabaseQuery { .. } => 3,
            StockpulseError::Provider { .. } | StockpulseError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

impl From<r2d2::Error> for StockpulseError {
    fn from(e: r2d2::Error) -> Self {
        StockpulseError::Database {
            reason: e.to_string(),
        }
    }
}

impl From<rusqlite::Error> for StockpulseError {
    fn from(e: rusqlite::Error) -> Self {
        StockpulseError::DatabaseQuery {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::ExitCode;

    #[test]
    fn no_data_message_names_symbol() {
        let err = StockpulseError::NoData {
            symbol: "PETR4.SA".into(),
        };
        assert_eq!(err.to_string(), "no data for PETR4.SA");
    }

    #[test]
    fn config_errors_map_to_exit_code_two() {
        let err = StockpulseError::ConfigMissing {
            section: "sqlite".into(),
            key: "path".into(),
        };
        assert_eq!(format!("{:?}", ExitCode::from(&err)), format!("{:?}", ExitCode::from(2)));
    }

    #[test]
    fn provider_errors_map_to_exit_code_five() {
        let err = StockpulseError::Provider {
            symbol: "AAPL".into(),
            reason: "HTTP 500".into(),
        };
        assert_eq!(format!("{:?}", ExitCode::from(&err)), format!("{:?}", ExitCode::from(5)));
    }

    #[test]
    fn rusqlite_error_becomes_query_error() {
        let err: StockpulseError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StockpulseError::DatabaseQuery { .. }));
    }
}
