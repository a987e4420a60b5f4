//! Analysis store port trait.
//!
//! The store is a single append-only table. Nothing enforces uniqueness of
//! (symbol, date): analysing the same symbol twice appends a second copy.

use crate::domain::analysis::{AnalysisRecord, StoredRecord};
use crate::domain::error::StockpulseError;

pub trait AnalysisStorePort {
    fn initialize_schema(&self) -> Result<(), StockpulseError>;

    /// Appends every record and returns how many rows were written.
    fn append_records(&self, records: &[AnalysisRecord]) -> Result<usize, StockpulseError>;

    /// Most recent rows for `symbol`, newest date first.
    fn latest_records(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<StoredRecord>, StockpulseError>;

    fn count_records(&self, symbol: &str) -> Result<usize, StockpulseError>;

    fn list_symbols(&self) -> Result<Vec<String>, StockpulseError>;
}
