//! Stock holdings enriched with vendor prices and sector-relative performance.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::performance::{Metrics, MetricTable, Performance, RelativeMetrics, Universe};
use super::pct_change;
use crate::db::{AssetClass, Position};

/// Vendor quote of one listed instrument
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentQuote {
    /// Vendor query key
    pub query: Option<String>,
    pub isin: Option<String>,
    pub last_price: Decimal,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub account_name: String,
    pub name: String,
    pub isin: Option<String>,
    /// GICS label as carried by the warehouse ("45 Information Technology")
    pub sector: Option<String>,
    pub region: Option<String>,
    /// Average entry quote in base currency
    pub aeq: Decimal,
    pub volume: Decimal,
    pub last_price: Decimal,
    pub since_aeq: Option<Decimal>,
    pub metrics: Metrics,
    pub relative: RelativeMetrics,
}

impl Performance for Holding {
    fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn relative(&self) -> &RelativeMetrics {
        &self.relative
    }

    fn since_entry(&self) -> Option<Decimal> {
        self.since_aeq
    }

    fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

/// Left join of stock positions with vendor quotes on ISIN.
///
/// Unmatched positions keep zero metrics; a missing or zero vendor price
/// falls back to the warehouse last quote. AEQ is converted with the
/// average entry FX rate.
pub fn enrich_stock_positions(positions: &[Position], quotes: &[InstrumentQuote]) -> Vec<Holding> {
    let by_isin: HashMap<&str, &InstrumentQuote> = quotes
        .iter()
        .filter_map(|q| q.isin.as_deref().map(|isin| (isin, q)))
        .collect();

    let mut unmatched = 0usize;
    let holdings: Vec<Holding> = positions
        .iter()
        .filter(|p| p.asset_class == AssetClass::Stock)
        .map(|p| {
            let quote = p.isin.as_deref().and_then(|isin| by_isin.get(isin)).copied();
            if quote.is_none() {
                unmatched += 1;
                debug!("No vendor quote for '{}' ({:?})", p.name, p.isin);
            }

            let vendor_price = quote.map(|q| q.last_price).unwrap_or_default();
            let last_price = if vendor_price.is_zero() {
                p.last_quote
            } else {
                vendor_price
            };
            let aeq = p.average_entry_quote * p.average_entry_xrate;

            Holding {
                account_name: p.account_name.clone(),
                name: p.name.clone(),
                isin: p.isin.clone(),
                sector: p.sector.clone().filter(|s| !s.trim().is_empty()),
                region: p.region.clone(),
                aeq,
                volume: p.volume,
                last_price,
                since_aeq: pct_change(aeq, last_price),
                metrics: quote.map(|q| q.metrics).unwrap_or_default(),
                relative: RelativeMetrics::default(),
            }
        })
        .collect();

    if unmatched > 0 {
        warn!("{} stock positions without vendor quotes, metrics left at zero", unmatched);
    }
    holdings
}

/// Fill "vs. Sector" deltas of each holding.
///
/// EU holdings compare against the EU sector table, North American ones
/// against the US table. Holdings in any other region or without a sector
/// get zero deltas and stay in the list.
pub fn positions_vs_sector(holdings: &mut [Holding], us: &MetricTable, eu: &MetricTable) -> Result<()> {
    for holding in holdings.iter_mut() {
        let universe = holding.region.as_deref().and_then(|r| match r.trim() {
            "EU" => Some(Universe::Eu),
            "NORTH AMERICA" => Some(Universe::Us),
            _ => None,
        });

        holding.relative = match (universe, holding.sector.as_deref()) {
            (Some(universe), Some(sector)) => {
                let table = match universe {
                    Universe::Us => us,
                    Universe::Eu => eu,
                };
                RelativeMetrics::between(&holding.metrics, table.require(sector)?)
            }
            _ => RelativeMetrics::default(),
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::exposure::fixtures::position;
    use crate::analytics::performance::Window;
    use crate::db::AssetCategory;
    use rust_decimal_macros::dec;

    fn stock(name: &str, isin: &str) -> Position {
        let mut p = position(name, AssetClass::Stock, AssetCategory::Equity);
        p.isin = Some(isin.to_string());
        p.average_entry_quote = dec!(50);
        p.average_entry_xrate = dec!(2);
        p.last_quote = dec!(99);
        p.sector = Some("45 Information Technology".to_string());
        p.region = Some("EU".to_string());
        p
    }

    fn metrics(d1: Decimal) -> Metrics {
        let mut m = Metrics::default();
        m.set_window(Window::OneDay, d1);
        m
    }

    #[test]
    fn test_enrichment_converts_aeq_and_falls_back_to_warehouse_quote() {
        let quotes = vec![InstrumentQuote {
            query: Some("SAP GY Equity".to_string()),
            isin: Some("DE0007164600".to_string()),
            last_price: dec!(110),
            metrics: metrics(dec!(1.5)),
        }];
        let positions = vec![stock("SAP", "DE0007164600"), stock("Unknown", "XX0000000000")];

        let holdings = enrich_stock_positions(&positions, &quotes);
        assert_eq!(holdings[0].aeq, dec!(100));
        assert_eq!(holdings[0].last_price, dec!(110));
        assert_eq!(holdings[0].since_aeq, Some(dec!(10)));
        assert_eq!(holdings[0].metrics.window(Window::OneDay), dec!(1.5));

        assert_eq!(holdings[1].last_price, dec!(99));
        assert_eq!(holdings[1].metrics, Metrics::default());
    }

    #[test]
    fn test_non_stock_positions_are_skipped() {
        let future = position("FESX", AssetClass::Future, AssetCategory::Equity);
        assert!(enrich_stock_positions(&[future], &[]).is_empty());
    }

    #[test]
    fn test_vs_sector_by_region() {
        let eu = MetricTable::new("GICS", vec![("45 Information Technology".to_string(), metrics(dec!(1)))]);
        let us = MetricTable::new("GICS", vec![("45 Information Technology".to_string(), metrics(dec!(-1)))]);

        let mut holdings = enrich_stock_positions(&[stock("SAP", "A")], &[]);
        holdings[0].metrics = metrics(dec!(3));
        let mut american = holdings[0].clone();
        american.region = Some("NORTH AMERICA".to_string());
        let mut asian = holdings[0].clone();
        asian.region = Some("ASIA".to_string());
        let mut unsectored = holdings[0].clone();
        unsectored.sector = None;
        holdings.extend([american, asian, unsectored]);

        positions_vs_sector(&mut holdings, &us, &eu).unwrap();
        let d1: Vec<Decimal> = holdings.iter().map(|h| h.relative.window(Window::OneDay)).collect();
        assert_eq!(d1, vec![dec!(2), dec!(4), dec!(0), dec!(0)]);
    }

    #[test]
    fn test_missing_sector_label_fails() {
        let eu = MetricTable::new("GICS", vec![("10 Energy".to_string(), metrics(dec!(1)))]);
        let mut holdings = enrich_stock_positions(&[stock("SAP", "A")], &[]);
        let err = positions_vs_sector(&mut holdings, &eu.clone(), &eu).unwrap_err();
        assert!(err.to_string().contains("45 Information Technology"));
    }
}
