#![allow(dead_code)]

use anyhow::{Context, Result};
use briefing::db::init_database;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const REPORT_DATE: &str = "2024-06-28";
pub const AKTIEN: (i64, &str) = (100, "D&R Aktien");
pub const NACHHALTIGKEIT: (i64, &str) = (200, "D&R Aktien Nachhaltigkeit");
pub const VV_ESG: (i64, &str) = (300, "VV-ESG Mustermann");

pub fn db_path(home: &TempDir) -> PathBuf {
    home.path().join("warehouse.db")
}

pub fn open_conn(path: &Path) -> Result<Connection> {
    Connection::open(path).context("failed to open test database")
}

pub fn insert_reporting(conn: &Connection, uuid: &str, report: &str, date: &str, newest: bool) -> Result<()> {
    conn.execute(
        "INSERT INTO reportings (uuid, report, report_date, newest) VALUES (?1, ?2, ?3, ?4)",
        params![uuid, report, date, newest as i64],
    )?;
    Ok(())
}

pub fn insert_segment(conn: &Connection, reporting: &str, segment: (i64, &str), nav: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO accountsegments (accountsegment_id, account_id, reporting_uuid, name, nav, currency)
         VALUES (?1, ?2, ?3, ?4, ?5, 'EUR')",
        params![segment.0, segment.0 * 10, reporting, segment.1, nav],
    )?;
    Ok(())
}

/// Warehouse row; decimals as text the way the warehouse stores them
#[derive(Debug, Clone)]
pub struct PositionRow {
    pub name: &'static str,
    pub isin: Option<&'static str>,
    pub bloomberg_query: Option<&'static str>,
    pub asset_class: &'static str,
    pub level_1: &'static str,
    pub level_2: Option<&'static str>,
    pub currency: &'static str,
    pub forex_trade_currency: Option<&'static str>,
    pub position_type: Option<&'static str>,
    pub volume: &'static str,
    pub average_entry_quote: &'static str,
    pub average_entry_xrate: &'static str,
    pub last_quote: &'static str,
    pub last_xrate: &'static str,
    pub price_per_point: &'static str,
    pub total_exposure: &'static str,
    pub value_base_ccy: &'static str,
    pub percent_nav: &'static str,
    pub underlying_name: Option<&'static str>,
    pub country: Option<&'static str>,
    pub sector: Option<&'static str>,
}

impl PositionRow {
    pub fn new(name: &'static str, asset_class: &'static str, level_1: &'static str) -> Self {
        Self {
            name,
            isin: None,
            bloomberg_query: None,
            asset_class,
            level_1,
            level_2: None,
            currency: "EUR",
            forex_trade_currency: None,
            position_type: Some("LONG"),
            volume: "0",
            average_entry_quote: "0",
            average_entry_xrate: "1",
            last_quote: "0",
            last_xrate: "1",
            price_per_point: "1",
            total_exposure: "0",
            value_base_ccy: "0",
            percent_nav: "0",
            underlying_name: None,
            country: None,
            sector: None,
        }
    }
}

pub fn insert_position(conn: &Connection, reporting: &str, segment: i64, p: &PositionRow) -> Result<()> {
    conn.execute(
        "INSERT INTO positions (
            reporting_uuid, account_segment_id, name, isin, bloomberg_query, asset_class,
            dr_class_level_1, dr_class_level_2, currency, forex_trade_currency, position_type,
            volume, average_entry_quote, average_entry_xrate, last_quote, last_xrate_quantity,
            price_per_point, total_exposure, value_base_ccy, percent_nav, underlying_name,
            country_of_domicile, gics_industry_sector)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
        params![
            reporting,
            segment,
            p.name,
            p.isin,
            p.bloomberg_query,
            p.asset_class,
            p.level_1,
            p.level_2,
            p.currency,
            p.forex_trade_currency,
            p.position_type,
            p.volume,
            p.average_entry_quote,
            p.average_entry_xrate,
            p.last_quote,
            p.last_xrate,
            p.price_per_point,
            p.total_exposure,
            p.value_base_ccy,
            p.percent_nav,
            p.underlying_name,
            p.country,
            p.sector,
        ],
    )?;
    Ok(())
}

pub fn sap() -> PositionRow {
    PositionRow {
        isin: Some("DE0007164600"),
        level_2: Some("EU"),
        volume: "1000",
        average_entry_quote: "100",
        last_quote: "148",
        total_exposure: "150000",
        value_base_ccy: "150000",
        country: Some("DE"),
        sector: Some("45 Information Technology"),
        ..PositionRow::new("SAP SE", "STOCK", "EQUITY")
    }
}

pub fn apple() -> PositionRow {
    PositionRow {
        isin: Some("US0378331005"),
        level_2: Some("NORTH AMERICA"),
        currency: "USD",
        volume: "500",
        average_entry_quote: "200",
        average_entry_xrate: "0.9",
        last_quote: "210",
        last_xrate: "0.9",
        total_exposure: "105000",
        value_base_ccy: "94500",
        country: Some("US"),
        sector: Some("45 Information Technology"),
        ..PositionRow::new("Apple Inc", "STOCK", "EQUITY")
    }
}

pub fn siemens_energy() -> PositionRow {
    PositionRow {
        isin: Some("DE000ENER6Y0"),
        level_2: Some("EU"),
        volume: "2000",
        average_entry_quote: "30",
        last_quote: "25",
        total_exposure: "50000",
        value_base_ccy: "50000",
        country: Some("DE"),
        sector: Some("10 Energy"),
        ..PositionRow::new("Siemens Energy AG", "STOCK", "EQUITY")
    }
}

pub fn euro_stoxx_future() -> PositionRow {
    PositionRow {
        level_2: Some("EU"),
        position_type: Some("SHORT"),
        volume: "10",
        average_entry_quote: "5000",
        last_quote: "4900",
        price_per_point: "10",
        total_exposure: "-490000",
        percent_nav: "-49",
        underlying_name: Some("EURO STOXX 50"),
        ..PositionRow::new("EURO STOXX 50 Sep24", "FUTURE", "EQUITY")
    }
}

pub fn eur_cash() -> PositionRow {
    PositionRow {
        total_exposure: "200000",
        value_base_ccy: "200000",
        position_type: None,
        ..PositionRow::new("EUR Cash", "CASH", "CASH")
    }
}

pub fn usd_forward() -> PositionRow {
    PositionRow {
        forex_trade_currency: Some("USD"),
        last_xrate: "1.25",
        total_exposure: "-50000",
        position_type: None,
        ..PositionRow::new("USD/EUR Forward", "FOREX", "FX")
    }
}

pub fn bund() -> PositionRow {
    PositionRow {
        total_exposure: "105500",
        value_base_ccy: "105500",
        position_type: None,
        ..PositionRow::new("Bund 2030", "BOND", "FIXED INCOME")
    }
}

pub fn asml() -> PositionRow {
    PositionRow {
        isin: Some("NL0010273215"),
        level_2: Some("EU"),
        volume: "100",
        average_entry_quote: "800",
        last_quote: "950",
        total_exposure: "95000",
        value_base_ccy: "95000",
        country: Some("NL"),
        sector: Some("45 Information Technology"),
        ..PositionRow::new("ASML Holding", "STOCK", "EQUITY")
    }
}

pub fn bond_fund() -> PositionRow {
    PositionRow {
        bloomberg_query: Some("GLBDF LX Equity"),
        volume: "100",
        average_entry_quote: "10",
        last_quote: "11",
        total_exposure: "1100",
        value_base_ccy: "1100",
        position_type: None,
        ..PositionRow::new("Global Bond Fund", "FUND_CLASS", "FIXED INCOME")
    }
}

/// Warehouse with one newest snapshot plus a stale and an older report
/// whose positions must never show up.
pub fn seed_warehouse(path: &Path) -> Result<()> {
    init_database(path)?;
    let conn = open_conn(path)?;

    insert_reporting(&conn, "old", "positions", "2024-06-27", true)?;
    insert_segment(&conn, "old", AKTIEN, "900000")?;
    insert_position(&conn, "old", AKTIEN.0, &PositionRow::new("Old Position", "STOCK", "EQUITY"))?;

    insert_reporting(&conn, "stale", "positions", REPORT_DATE, false)?;
    insert_segment(&conn, "stale", AKTIEN, "1000000")?;
    insert_position(&conn, "stale", AKTIEN.0, &PositionRow::new("Stale Position", "STOCK", "EQUITY"))?;

    insert_reporting(&conn, "today", "positions", REPORT_DATE, true)?;
    insert_segment(&conn, "today", AKTIEN, "1000000")?;
    insert_segment(&conn, "today", NACHHALTIGKEIT, "500000")?;
    insert_segment(&conn, "today", VV_ESG, "200000")?;

    for position in [
        sap(),
        apple(),
        siemens_energy(),
        euro_stoxx_future(),
        eur_cash(),
        usd_forward(),
        bund(),
    ] {
        insert_position(&conn, "today", AKTIEN.0, &position)?;
    }
    insert_position(&conn, "today", NACHHALTIGKEIT.0, &asml())?;
    insert_position(&conn, "today", VV_ESG.0, &bond_fund())?;

    Ok(())
}
