//! NAV-relative exposure and the currency hedge breakdown.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::db::{AssetCategory, AssetClass, Position};
use crate::error::BriefingError;

/// Exposure of one position in % of NAV: total_exposure × fx / nav × 100
pub fn position_exposure(total_exposure: Decimal, fx: Decimal, nav: Decimal) -> Result<Decimal> {
    if nav.is_zero() {
        return Err(BriefingError::InsufficientData("NAV is zero".to_string()).into());
    }
    Ok(total_exposure * fx / nav * Decimal::ONE_HUNDRED)
}

/// Exposure of a warehouse position against its own account NAV
pub fn exposure_of(position: &Position) -> Result<Decimal> {
    position_exposure(position.total_exposure, position.last_xrate, position.nav)
}

/// One currency row of the hedge table, all in % of NAV
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CurrencyExposure {
    pub currency: String,
    pub stocks: Decimal,
    pub cash: Decimal,
    pub futures: Decimal,
    pub forex: Decimal,
    pub sum: Decimal,
}

impl CurrencyExposure {
    fn named(currency: &str) -> Self {
        Self {
            currency: currency.to_string(),
            ..Default::default()
        }
    }

    fn accumulate(&mut self, other: &CurrencyExposure) {
        self.stocks += other.stocks;
        self.cash += other.cash;
        self.futures += other.futures;
        self.forex += other.forex;
        self.sum += other.sum;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HedgeReport {
    /// Sorted by currency
    pub rows: Vec<CurrencyExposure>,
    pub total: CurrencyExposure,
    /// Names of positions no bucket applies to
    pub unclassified: Vec<String>,
}

enum Bucket {
    Stocks,
    Cash,
    /// Equity future, taken from percent_nav
    Futures,
    Forex,
    /// FX future, nets against spot forex
    FxFuture,
}

fn bucket_of(position: &Position) -> Option<Bucket> {
    match (position.asset_class, &position.category) {
        (AssetClass::Stock, _) => Some(Bucket::Stocks),
        (AssetClass::Cash, _) => Some(Bucket::Cash),
        (AssetClass::Forex, _) => Some(Bucket::Forex),
        (AssetClass::Future, AssetCategory::Equity) => Some(Bucket::Futures),
        (AssetClass::Future, AssetCategory::Fx) => Some(Bucket::FxFuture),
        _ => None,
    }
}

/// Exposure in base currency after FX adjustment.
///
/// FX futures are already in base currency. Spot forex divides by the rate,
/// everything else multiplies by it.
fn base_exposure(position: &Position) -> Result<Decimal> {
    if position.is_fx_future() {
        return Ok(position.total_exposure);
    }
    if position.asset_class == AssetClass::Forex {
        if position.last_xrate.is_zero() {
            return Err(BriefingError::InsufficientData(format!(
                "zero FX rate on forex position '{}'",
                position.name
            ))
            .into());
        }
        return Ok(position.total_exposure / position.last_xrate);
    }
    Ok(position.total_exposure * position.last_xrate)
}

/// Currency breakdown of a complete mandate snapshot.
///
/// NAV is the sum of base-currency value over every position, including
/// the bonds that are then dropped from the table.
pub fn hedge_exposure(positions: &[Position]) -> Result<HedgeReport> {
    let nav: Decimal = positions.iter().map(|p| p.value_base_ccy).sum();
    if nav.is_zero() {
        return Err(BriefingError::InsufficientData("hedge snapshot has zero NAV".to_string()).into());
    }

    let hundred = Decimal::ONE_HUNDRED;
    let mut by_currency: BTreeMap<String, CurrencyExposure> = BTreeMap::new();
    let mut unclassified = Vec::new();

    for position in positions {
        if position.asset_class == AssetClass::Bond || position.category == AssetCategory::FixedIncome {
            continue;
        }

        let Some(bucket) = bucket_of(position) else {
            warn!(
                "No hedge bucket for {} / {} position '{}'",
                position.asset_class,
                position.category.as_str(),
                position.name
            );
            unclassified.push(position.name.clone());
            continue;
        };

        let currency = match position.asset_class {
            AssetClass::Forex => position.forex_trade_currency.as_deref(),
            _ => position.currency.as_deref(),
        }
        .unwrap_or_default();

        let pct = base_exposure(position)? / nav;
        let row = by_currency
            .entry(currency.to_string())
            .or_insert_with(|| CurrencyExposure::named(currency));

        match bucket {
            Bucket::Stocks => row.stocks += pct * hundred,
            Bucket::Cash => row.cash += pct * hundred,
            Bucket::Futures => row.futures += position.percent_nav,
            Bucket::Forex => row.forex += pct * hundred,
            Bucket::FxFuture => row.forex -= pct * hundred,
        }
    }

    let mut total = CurrencyExposure::named("Total");
    let rows: Vec<CurrencyExposure> = by_currency
        .into_values()
        .map(|mut row| {
            row.sum = row.stocks + row.cash + row.futures + row.forex;
            total.accumulate(&row);
            row
        })
        .collect();

    debug!("Hedge table: {} currencies, NAV {}", rows.len(), nav);
    Ok(HedgeReport {
        rows,
        total,
        unclassified,
    })
}
