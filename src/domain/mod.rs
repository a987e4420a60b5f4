//! Core domain types and logic.

pub mod analysis;
pub mod config_validation;
pub mod error;
pub mod forecast;
pub mod indicator;
pub mod ohlcv;
pub mod recommendation;
pub mod watchlist;
