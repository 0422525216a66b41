//! Position warehouse queries against a seeded SQLite file

mod sqlite_helpers;

use anyhow::Result;
use briefing::db::{AccountFilter, AssetCategory, AssetClass, PositionSource, SqliteWarehouse};
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sqlite_helpers::*;
use tempfile::TempDir;

fn seeded() -> Result<(TempDir, SqliteWarehouse)> {
    let home = TempDir::new()?;
    let path = db_path(&home);
    seed_warehouse(&path)?;
    let warehouse = SqliteWarehouse::open(&path)?;
    Ok((home, warehouse))
}

#[test]
fn test_only_newest_snapshot_of_latest_date() -> Result<()> {
    let (_home, warehouse) = seeded()?;
    let positions = warehouse.latest_positions(&AccountFilter::segment(AKTIEN.0))?;

    assert_eq!(positions.len(), 7);
    assert!(positions.iter().all(|p| p.name != "Old Position" && p.name != "Stale Position"));
    assert!(positions
        .iter()
        .all(|p| p.report_date == NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()));
    Ok(())
}

#[test]
fn test_segment_filter_selects_accounts() -> Result<()> {
    let (_home, warehouse) = seeded()?;
    let positions = warehouse.latest_positions(&AccountFilter::Segments(vec![AKTIEN.0, NACHHALTIGKEIT.0]))?;

    assert_eq!(positions.len(), 8);
    let asml = positions.iter().find(|p| p.name == "ASML Holding").unwrap();
    assert_eq!(asml.account_name, NACHHALTIGKEIT.1);
    assert_eq!(asml.account_id, NACHHALTIGKEIT.0 * 10);
    assert_eq!(asml.nav, dec!(500000));
    Ok(())
}

#[test]
fn test_name_filter_matches_substrings() -> Result<()> {
    let (_home, warehouse) = seeded()?;

    let esg = warehouse.latest_positions(&AccountFilter::NameContains(vec!["VV-ESG".to_string()]))?;
    assert_eq!(esg.len(), 1);
    assert_eq!(esg[0].name, "Global Bond Fund");
    assert!(esg[0].is_fund());

    // "Aktien" is part of both mandate names
    let aktien = warehouse.latest_positions(&AccountFilter::NameContains(vec!["Aktien".to_string()]))?;
    assert_eq!(aktien.len(), 8);
    Ok(())
}

#[test]
fn test_empty_filter_returns_nothing() -> Result<()> {
    let (_home, warehouse) = seeded()?;
    assert!(warehouse.latest_positions(&AccountFilter::Segments(Vec::new()))?.is_empty());
    assert!(warehouse.latest_positions(&AccountFilter::segment(999))?.is_empty());
    Ok(())
}

#[test]
fn test_row_fields_are_parsed() -> Result<()> {
    let (_home, warehouse) = seeded()?;
    let positions = warehouse.latest_positions(&AccountFilter::segment(AKTIEN.0))?;

    let future = positions.iter().find(|p| p.asset_class == AssetClass::Future).unwrap();
    assert!(future.is_equity_future());
    assert_eq!(future.position_type.as_deref(), Some("SHORT"));
    assert_eq!(future.total_exposure, dec!(-490000));
    assert_eq!(future.percent_nav, dec!(-49));
    assert_eq!(future.underlying_name.as_deref(), Some("EURO STOXX 50"));

    let forward = positions.iter().find(|p| p.asset_class == AssetClass::Forex).unwrap();
    assert_eq!(forward.category, AssetCategory::Fx);
    assert_eq!(forward.forex_trade_currency.as_deref(), Some("USD"));
    assert_eq!(forward.last_xrate, dec!(1.25));

    let apple = positions.iter().find(|p| p.name == "Apple Inc").unwrap();
    assert_eq!(apple.region.as_deref(), Some("NORTH AMERICA"));
    assert_eq!(apple.average_entry_xrate, dec!(0.9));
    assert_eq!(apple.sector.as_deref(), Some("45 Information Technology"));
    Ok(())
}

#[test]
fn test_missing_warehouse_file_is_an_error() {
    let home = TempDir::new().unwrap();
    let err = SqliteWarehouse::open(home.path().join("absent.db")).err().unwrap();
    assert!(err.to_string().contains("warehouse not found"));
}

#[test]
fn test_unknown_asset_class_fails_the_query() -> Result<()> {
    let (home, warehouse) = seeded()?;
    let conn = open_conn(&db_path(&home))?;
    insert_position(&conn, "today", AKTIEN.0, &PositionRow::new("Call Option", "OPTION", "EQUITY"))?;

    let err = warehouse.latest_positions(&AccountFilter::segment(AKTIEN.0)).unwrap_err();
    assert!(format!("{:#}", err).contains("unsupported asset class: OPTION"));
    Ok(())
}
