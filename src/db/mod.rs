// Database module - position warehouse access

pub mod models;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params_from_iter, Connection, Row};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::BriefingError;
pub use models::{AssetCategory, AssetClass, Position, PositionType};

/// Which account segments to pull from the newest snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountFilter {
    /// Account segment ids
    Segments(Vec<i64>),
    /// Substrings of the account segment name (SQL `LIKE '%pattern%'`)
    NameContains(Vec<String>),
}

impl AccountFilter {
    pub fn segment(id: i64) -> Self {
        AccountFilter::Segments(vec![id])
    }

    fn is_empty(&self) -> bool {
        match self {
            AccountFilter::Segments(ids) => ids.is_empty(),
            AccountFilter::NameContains(patterns) => patterns.is_empty(),
        }
    }
}

/// Provider of position snapshots.
///
/// The daily pipeline only ever needs the latest dated snapshot; implementors
/// return every position of the matching account segments on that date.
pub trait PositionSource {
    fn latest_positions(&self, filter: &AccountFilter) -> Result<Vec<Position>>;
}

/// In-memory snapshot, used for tests and for replaying exported data
#[derive(Debug, Clone, Default)]
pub struct StaticPositions(pub Vec<Position>);

impl PositionSource for StaticPositions {
    fn latest_positions(&self, filter: &AccountFilter) -> Result<Vec<Position>> {
        let matches = |p: &Position| match filter {
            AccountFilter::Segments(ids) => ids.contains(&p.account_segment_id),
            AccountFilter::NameContains(patterns) => {
                patterns.iter().any(|pat| p.account_name.contains(pat.as_str()))
            }
        };
        Ok(self.0.iter().filter(|p| matches(p)).cloned().collect())
    }
}

/// Open database connection
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection> {
    let path = path.as_ref();
    let conn =
        Connection::open(path).context(format!("Failed to open database at {:?}", path))?;

    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("Failed to enable foreign keys")?;

    Ok(conn)
}

/// Initialize the warehouse schema
///
/// Only needed for local development and tests; the production warehouse is
/// populated by the reporting system.
pub fn init_database<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Initializing database at: {:?}", path);

    let conn = open_db(path)?;
    conn.execute_batch(include_str!("schema.sql"))
        .context("Failed to execute schema")?;

    info!("Database initialized successfully");
    Ok(())
}

/// SQLite-backed position warehouse
pub struct SqliteWarehouse {
    conn: Connection,
}

const POSITION_COLUMNS: &str = "
    accountsegments.accountsegment_id,
    accountsegments.account_id,
    accountsegments.name,
    accountsegments.nav,
    accountsegments.currency,
    reportings.report_date,
    positions.name,
    positions.isin,
    positions.bloomberg_query,
    positions.asset_class,
    positions.dr_class_level_1,
    positions.dr_class_level_2,
    positions.currency,
    positions.forex_trade_currency,
    positions.position_type,
    positions.volume,
    positions.average_entry_quote,
    positions.average_entry_xrate,
    positions.last_quote,
    positions.last_xrate_quantity,
    positions.price_per_point,
    positions.total_exposure,
    positions.value_base_ccy,
    positions.percent_nav,
    positions.underlying_name,
    positions.country_of_domicile,
    positions.gics_industry_sector";

impl SqliteWarehouse {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BriefingError::Db(format!("warehouse not found at {:?}", path)).into());
        }
        Ok(Self::new(open_db(path)?))
    }

    fn build_query(filter: &AccountFilter) -> (String, Vec<String>) {
        let (clause, params): (String, Vec<String>) = match filter {
            AccountFilter::Segments(ids) => {
                let placeholders = vec!["?"; ids.len()].join(", ");
                (
                    format!("accountsegments.accountsegment_id IN ({})", placeholders),
                    ids.iter().map(|id| id.to_string()).collect(),
                )
            }
            AccountFilter::NameContains(patterns) => {
                let clause = vec!["accountsegments.name LIKE ?"; patterns.len()].join(" OR ");
                (
                    format!("({})", clause),
                    patterns.iter().map(|p| format!("%{}%", p)).collect(),
                )
            }
        };

        let sql = format!(
            "SELECT {columns}
             FROM reportings
             JOIN accountsegments ON (accountsegments.reporting_uuid = reportings.uuid)
             JOIN positions ON (reportings.uuid = positions.reporting_uuid)
             WHERE positions.account_segment_id = accountsegments.accountsegment_id
               AND reportings.newest = 1
               AND reportings.report = 'positions'
               AND {clause}
               AND reportings.report_date = (SELECT MAX(report_date) FROM reportings)
             ORDER BY accountsegments.name, positions.id",
            columns = POSITION_COLUMNS,
            clause = clause
        );

        (sql, params)
    }
}

impl PositionSource for SqliteWarehouse {
    fn latest_positions(&self, filter: &AccountFilter) -> Result<Vec<Position>> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }

        let (sql, params) = Self::build_query(filter);
        debug!("Position query for {:?}", filter);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;

        let mut positions = Vec::new();
        while let Some(row) = rows.next()? {
            positions.push(position_from_row(row)?);
        }

        info!("Loaded {} positions for {:?}", positions.len(), filter);
        Ok(positions)
    }
}

fn position_from_row(row: &Row) -> Result<Position> {
    let asset_class: String = row.get(9)?;
    let category: Option<String> = row.get(10)?;

    Ok(Position {
        account_segment_id: row.get(0)?,
        account_id: row.get(1)?,
        account_name: row.get(2)?,
        nav: get_decimal_value(row, 3)?,
        base_currency: row.get(4)?,
        report_date: row.get::<_, NaiveDate>(5)?,
        name: row.get(6)?,
        isin: row.get(7)?,
        bloomberg_query: row.get(8)?,
        asset_class: AssetClass::from_str(&asset_class)?,
        category: AssetCategory::parse(category.as_deref().unwrap_or_default()),
        region: row.get(11)?,
        currency: row.get(12)?,
        forex_trade_currency: row.get(13)?,
        position_type: row.get(14)?,
        volume: get_decimal_value(row, 15)?,
        average_entry_quote: get_decimal_value(row, 16)?,
        average_entry_xrate: get_decimal_value(row, 17)?,
        last_quote: get_decimal_value(row, 18)?,
        last_xrate: get_decimal_value(row, 19)?,
        price_per_point: get_decimal_value(row, 20)?,
        total_exposure: get_decimal_value(row, 21)?,
        value_base_ccy: get_decimal_value(row, 22)?,
        percent_nav: get_decimal_value(row, 23)?,
        underlying_name: row.get(24)?,
        country: row.get(25)?,
        sector: row.get(26)?,
    })
}

/// Helper to read Decimal from SQLite (handles TEXT, INTEGER, REAL and NULL)
///
/// NULL reads as zero, matching how the warehouse leaves quotes empty on cash
/// and FX rows.
fn get_decimal_value(row: &Row, idx: usize) -> Result<Decimal, rusqlite::Error> {
    use rusqlite::types::ValueRef;

    match row.get_ref(idx)? {
        ValueRef::Null => Ok(Decimal::ZERO),
        ValueRef::Integer(i) => Ok(Decimal::from(i)),
        ValueRef::Real(f) => Decimal::from_f64(f).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(idx, format!("{}", f), rusqlite::types::Type::Real)
        }),
        ValueRef::Text(bytes) => {
            let text = String::from_utf8_lossy(bytes);
            let text = text.trim();
            if text.is_empty() {
                return Ok(Decimal::ZERO);
            }
            Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
        }
        ValueRef::Blob(_) => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "decimal".to_string(),
            rusqlite::types::Type::Blob,
        )),
    }
}
