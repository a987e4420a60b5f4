//! Symbol lists.
//!
//! Parses symbol lists from configuration or the command line and carries the
//! built-in watchlists used when none is given.

use std::collections::HashSet;

/// Symbols analyzed by a batch run when no list is configured: Brazilian and US
/// equities, index ETFs, European and Asian listings, and crypto pairs.
pub const DEFAULT_WATCHLIST: &[&str] = &[
    "PETR4.SA", "ITUB4.SA", "BBDC4.SA", "VALE3.SA", "BBAS3.SA", "ABEV3.SA", "MGLU3.SA",
    "B3SA3.SA", "WEGE3.SA", "RADL3.SA", "RENT3.SA", "HAPV3.SA", "GGBR4.SA", "CSNA3.SA",
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "NFLX", "BRK-B", "V",
    "JNJ", "PG", "DIS", "XOM", "CVX", "KO", "PEP", "MCD", "INTC", "CSCO",
    "SPY", "QQQ", "DIA", "IVV", "VTI", "VOO", "ARKK", "XLK", "XLF", "XLE",
    "BMW.DE", "DAI.DE", "SAP.DE", "HSBA.L", "BABA", "TCEHY", "TSM", "NIO", "JD", "SONY",
    "BTC-USD", "ETH-USD", "BNB-USD", "XRP-USD", "ADA-USD", "SOL-USD", "DOT-USD", "DOGE-USD",
    "MATIC-USD", "LTC-USD", "SHIB-USD", "AVAX-USD", "LINK-USD", "XLM-USD", "UNI-USD", "ALGO-USD",
    "TRX-USD", "NEO-USD", "XTZ-USD", "MKR-USD", "AAVE-USD", "YFI-USD", "COMP-USD", "CRV-USD",
    "SUSHI-USD", "KSM-USD", "FIL-USD", "RUNE-USD", "EGLD-USD", "KAVA-USD",
];

/// Symbols offered on the web dashboard.
pub const DASHBOARD_WATCHLIST: &[&str] = &[
    "PETR4.SA", "VALE3.SA", "ITUB4.SA", "BBDC4.SA", "BBAS3.SA",
    "WEGE3.SA", "ABEV3.SA", "MGLU3.SA", "RENT3.SA", "GGBR4.SA",
    "AAPL", "GOOG", "MSFT", "TSLA", "AMZN",
];

/// Pre-selected on the dashboard.
pub const DASHBOARD_DEFAULT_SELECTION: &[&str] = &["PETR4.SA", "AAPL"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WatchlistError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),
}

pub fn parse_symbols(input: &str) -> Result<Vec<String>, WatchlistError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let symbol = normalize_symbol(token)?;
        if !seen.insert(symbol.clone()) {
            return Err(WatchlistError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}

/// Trims and upper-cases a symbol. Provider symbols use letters, digits,
/// '.', '-', '=' and '^' only.
pub fn normalize_symbol(token: &str) -> Result<String, WatchlistError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Err(WatchlistError::EmptyToken);
    }
    let valid = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '=' | '^'));
    if !valid {
        return Err(WatchlistError::InvalidSymbol(trimmed.to_string()));
    }
    Ok(trimmed.to_uppercase())
}

pub fn default_watchlist() -> Vec<String> {
    DEFAULT_WATCHLIST.iter().map(|s| s.to_string()).collect()
}
