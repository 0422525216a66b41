//! Portfolio allocation against the blended benchmark.
//!
//! Equity futures are looked through into their index sector weights, then
//! sector and country exposure is compared with the benchmark's current
//! weights.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::benchmark::{Basket, BasketMember};
use super::exposure::exposure_of;
use super::sectors::{numbered_label, strip_code};
use crate::db::{AssetCategory, AssetClass, Position};

const US_COUNTRY: &str = "US";

/// Portfolio line used for allocation, exposure in % of NAV
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationRow {
    pub name: String,
    pub asset_class: AssetClass,
    pub underlying: Option<String>,
    pub exposure: Decimal,
    pub country: Option<String>,
    /// Bare sector name, GICS code stripped
    pub sector: Option<String>,
}

impl AllocationRow {
    /// Equity stocks and futures only; anything else has no place in the
    /// sector comparison.
    pub fn from_positions(positions: &[Position]) -> Result<Vec<AllocationRow>> {
        positions
            .iter()
            .filter(|p| {
                matches!(p.asset_class, AssetClass::Stock | AssetClass::Future)
                    && p.category == AssetCategory::Equity
            })
            .map(|p| {
                Ok(AllocationRow {
                    name: p.name.clone(),
                    asset_class: p.asset_class,
                    underlying: p.underlying_name.clone(),
                    exposure: exposure_of(p)?,
                    country: p.country.clone(),
                    sector: p.sector.as_deref().map(|s| strip_code(s).to_string()),
                })
            })
            .collect()
    }
}

/// Sector split of one index underlying, weights normalised to 100
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookthroughRow {
    pub region: Option<String>,
    pub weights: Vec<(String, Decimal)>,
}

/// Sector weights per future underlying
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectorLookthrough {
    rows: BTreeMap<String, LookthroughRow>,
}

impl SectorLookthrough {
    /// Normalises every row so its weights sum to 100. Rows summing to zero
    /// are dropped.
    pub fn new(rows: impl IntoIterator<Item = (String, LookthroughRow)>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|(underlying, mut row)| {
                let total: Decimal = row.weights.iter().map(|(_, w)| *w).sum();
                if total.is_zero() {
                    debug!("Dropping look-through row '{}' with zero weight", underlying);
                    return None;
                }
                for (_, weight) in &mut row.weights {
                    *weight = *weight / total * Decimal::ONE_HUNDRED;
                }
                Some((underlying, row))
            })
            .collect();
        Self { rows }
    }

    pub fn get(&self, underlying: &str) -> Option<&LookthroughRow> {
        self.rows.get(underlying)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Replace each future that has a look-through row with one synthetic row
/// per sector, exposure scaled by the sector weight.
pub fn adjust_for_futures(rows: Vec<AllocationRow>, lookthrough: &SectorLookthrough) -> Vec<AllocationRow> {
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let split = match (&row.asset_class, &row.underlying) {
            (AssetClass::Future, Some(underlying)) => lookthrough.get(underlying).map(|l| (underlying, l)),
            _ => None,
        };

        match split {
            Some((underlying, split)) => {
                debug!("Looking through future '{}' into {} sectors", row.name, split.weights.len());
                out.extend(split.weights.iter().map(|(sector, weight)| AllocationRow {
                    name: format!("{}_{}", underlying, sector),
                    asset_class: AssetClass::Future,
                    underlying: Some(underlying.clone()),
                    exposure: *weight * row.exposure / Decimal::ONE_HUNDRED,
                    country: split.region.clone(),
                    sector: Some(sector.clone()),
                }));
            }
            None => out.push(row),
        }
    }

    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub label: String,
    pub benchmark: Decimal,
    pub portfolio: Decimal,
    /// Portfolio - Benchmark
    pub difference: Decimal,
}

impl ComparisonRow {
    fn new(label: String, benchmark: Decimal, portfolio: Decimal) -> Self {
        Self {
            label,
            benchmark,
            portfolio,
            difference: portfolio - benchmark,
        }
    }

    fn sum(label: &str, rows: &[ComparisonRow]) -> Self {
        let benchmark = rows.iter().map(|r| r.benchmark).sum();
        let portfolio = rows.iter().map(|r| r.portfolio).sum();
        Self::new(label.to_string(), benchmark, portfolio)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub index_name: String,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    pub fn get(&self, label: &str) -> Option<&ComparisonRow> {
        self.rows.iter().find(|r| r.label == label)
    }
}

/// Outer join of two grouped sums, missing side = 0, sorted by key
fn compare<'a>(
    benchmark: impl Iterator<Item = (&'a str, Decimal)>,
    portfolio: impl Iterator<Item = (&'a str, Decimal)>,
) -> Vec<ComparisonRow> {
    let mut joined: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
    for (key, weight) in benchmark {
        joined.entry(key).or_default().0 += weight;
    }
    for (key, exposure) in portfolio {
        joined.entry(key).or_default().1 += exposure;
    }
    joined
        .into_iter()
        .map(|(key, (b, p))| ComparisonRow::new(key.to_string(), b, p))
        .collect()
}

fn sector_comparison<'a>(
    index_name: &str,
    benchmark: impl Iterator<Item = &'a BasketMember>,
    portfolio: impl Iterator<Item = &'a AllocationRow>,
) -> ComparisonTable {
    let bench = benchmark.filter_map(|m| m.sector.as_deref().map(|s| (s, m.current_weight)));
    let port = portfolio.filter_map(|r| r.sector.as_deref().map(|s| (s, r.exposure)));

    let mut rows: Vec<ComparisonRow> = compare(bench, port)
        .into_iter()
        .map(|row| ComparisonRow {
            label: numbered_label(&row.label),
            ..row
        })
        .collect();
    rows.sort_by(|a, b| a.label.cmp(&b.label));
    rows.push(ComparisonRow::sum("Sum", &rows));

    ComparisonTable {
        index_name: index_name.to_string(),
        rows,
    }
}

fn region_comparison(benchmark: &Basket, portfolio: &[AllocationRow]) -> ComparisonTable {
    let bench = benchmark
        .members
        .iter()
        .filter_map(|m| m.country.as_deref().map(|c| (c, m.current_weight)));
    let port = portfolio
        .iter()
        .filter_map(|r| r.country.as_deref().map(|c| (c, r.exposure)));

    ComparisonTable {
        index_name: "Country".to_string(),
        rows: compare(bench, port),
    }
}

/// Keep countries with |difference| above `threshold`, fold the rest into
/// "Other", then append "Sum".
pub fn condense_regions(all: &ComparisonTable, threshold: Decimal) -> ComparisonTable {
    let (mut kept, folded): (Vec<ComparisonRow>, Vec<ComparisonRow>) = all
        .rows
        .iter()
        .cloned()
        .partition(|r| r.difference.abs() > threshold);

    kept.push(ComparisonRow::sum("Other", &folded));
    let sum = ComparisonRow::sum("Sum", &kept);
    kept.push(sum);

    ComparisonTable {
        index_name: "Region".to_string(),
        rows: kept,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationReport {
    pub sector: ComparisonTable,
    pub region_all: ComparisonTable,
    pub region: ComparisonTable,
    pub us_sector: ComparisonTable,
    pub eu_sector: ComparisonTable,
}

/// Sector and country allocation of a portfolio against the blended benchmark
pub fn allocation(
    portfolio: Vec<AllocationRow>,
    benchmark: &Basket,
    lookthrough: &SectorLookthrough,
    region_threshold: Decimal,
) -> AllocationReport {
    let portfolio = adjust_for_futures(portfolio, lookthrough);
    info!(
        "Allocation over {} portfolio rows vs {} benchmark members",
        portfolio.len(),
        benchmark.members.len()
    );

    let sector = sector_comparison("EU/US Sector", benchmark.members.iter(), portfolio.iter());

    let region_all = region_comparison(benchmark, &portfolio);
    let region = condense_regions(&region_all, region_threshold);

    let is_us = |country: Option<&str>| country == Some(US_COUNTRY);
    let us_sector = sector_comparison(
        "US Sector",
        benchmark.members.iter().filter(|m| is_us(m.country.as_deref())),
        portfolio.iter().filter(|r| is_us(r.country.as_deref())),
    );
    let eu_sector = sector_comparison(
        "EU Sector",
        benchmark.members.iter().filter(|m| !is_us(m.country.as_deref())),
        portfolio.iter().filter(|r| !is_us(r.country.as_deref())),
    );

    AllocationReport {
        sector,
        region_all,
        region,
        us_sector,
        eu_sector,
    }
}
