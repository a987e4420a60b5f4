//! SQLite analysis store.
//!
//! One append-only `analysis` table. Rows are never updated or deleted and
//! repeated runs for the same symbol and date produce duplicate rows.

use crate::domain::analysis::{AnalysisRecord, StoredRecord};
use crate::domain::error::StockpulseError;
use crate::domain::recommendation::Recommendation;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::AnalysisStorePort;
use chrono::NaiveDate;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Row};
use tracing::debug;

pub const DEFAULT_DB_PATH: &str = "stock_analysis.db";
pub const DEFAULT_POOL_SIZE: i64 = 4;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, StockpulseError> {
        let db_path = config
            .get_string("sqlite", "path")
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let configured = config.get_int("sqlite", "pool_size", DEFAULT_POOL_SIZE);
        let pool_size = u32::try_from(configured)
            .ok()
            .filter(|size| *size > 0)
            .ok_or_else(|| StockpulseError::ConfigInvalid {
                section: "sqlite".into(),
                key: "pool_size".into(),
                reason: format!("pool size {} is out of range", configured),
            })?;

        Self::open(&db_path, pool_size)
    }

    pub fn open(db_path: &str, pool_size: u32) -> Result<Self, StockpulseError> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder().max_size(pool_size).build(manager)?;
        debug!(path = db_path, pool_size, "opened sqlite pool");
        Ok(Self { pool })
    }

    /// Single-connection pool so every caller sees the same in-memory database.
    pub fn in_memory() -> Result<Self, StockpulseError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        Ok(Self { pool })
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
    let date_str: String = row.get(2)?;
    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let label: String = row.get(8)?;
    let recommendation = label.parse::<Recommendation>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(8, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(StoredRecord {
        id: row.get(0)?,
        record: AnalysisRecord {
            symbol: row.get(1)?,
            date,
            price: row.get(3)?,
            ma50: row.get(4)?,
            ma100: row.get(5)?,
            ma200: row.get(6)?,
            rsi: row.get(7)?,
            recommendation,
        },
    })
}

impl AnalysisStorePort for SqliteAdapter {
    fn initialize_schema(&self) -> Result<(), StockpulseError> {
        let conn = self.pool.get()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS analysis (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                symbol TEXT,
                date TEXT,
                price REAL,
                ma50 REAL,
                ma100 REAL,
                ma200 REAL,
                rsi REAL,
                recommendation TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_analysis_symbol_date ON analysis(symbol, date);",
        )?;

        Ok(())
    }

    fn append_records(&self, records: &[AnalysisRecord]) -> Result<usize, StockpulseError> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO analysis (symbol, date, price, ma50, ma100, ma200, rsi, recommendation)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for record in records {
                stmt.execute(params![
                    record.symbol,
                    record.date.format(DATE_FORMAT).to_string(),
                    record.price,
                    record.ma50,
                    record.ma100,
                    record.ma200,
                    record.rsi,
                    record.recommendation.label(),
                ])?;
            }
        }

        tx.commit()?;
        debug!(rows = records.len(), "appended analysis records");
        Ok(records.len())
    }

    fn latest_records(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<StoredRecord>, StockpulseError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, symbol, date, price, ma50, ma100, ma200, rsi, recommendation
             FROM analysis
             WHERE symbol = ?1
             ORDER BY date DESC, id DESC
             LIMIT ?2",
        )?;

        let rows = stmt.query_map(params![symbol, limit as i64], record_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn count_records(&self, symbol: &str) -> Result<usize, StockpulseError> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM analysis WHERE symbol = ?1",
            params![symbol],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn list_symbols(&self) -> Result<Vec<String>, StockpulseError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT DISTINCT symbol FROM analysis ORDER BY symbol")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row?);
        }
        Ok(symbols)
    }
}
