//! Relative performance engine.
//!
//! Trailing returns over fixed windows, market-cap weighted sector
//! aggregates, and "vs. Sector" deltas for universes and holdings.

use anyhow::Result;
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

use super::sectors::strip_code;
use crate::error::BriefingError;

/// Trailing performance window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Window {
    OneDay,
    FiveDays,
    OneMonth,
    YearToDate,
}

impl Window {
    pub const ALL: [Window; 4] = [
        Window::OneDay,
        Window::FiveDays,
        Window::OneMonth,
        Window::YearToDate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Window::OneDay => "1D",
            Window::FiveDays => "5D",
            Window::OneMonth => "1MO",
            Window::YearToDate => "YTD",
        }
    }

    fn index(&self) -> usize {
        match self {
            Window::OneDay => 0,
            Window::FiveDays => 1,
            Window::OneMonth => 2,
            Window::YearToDate => 3,
        }
    }
}

/// Market metrics of one instrument or aggregate, all in percent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub returns: [Decimal; 4],
    /// Δ to the 200-day moving average
    pub mov_avg_200: Decimal,
    /// Δ to the 52-week high
    pub high_52w: Decimal,
}

impl Metrics {
    pub fn window(&self, window: Window) -> Decimal {
        self.returns[window.index()]
    }

    pub fn set_window(&mut self, window: Window, value: Decimal) {
        self.returns[window.index()] = value;
    }

    fn scaled(&self, factor: Decimal) -> Self {
        Self {
            returns: self.returns.map(|r| r * factor),
            mov_avg_200: self.mov_avg_200 * factor,
            high_52w: self.high_52w * factor,
        }
    }

    fn add(&mut self, other: &Metrics) {
        for (a, b) in self.returns.iter_mut().zip(other.returns) {
            *a += b;
        }
        self.mov_avg_200 += other.mov_avg_200;
        self.high_52w += other.high_52w;
    }

    fn minus(&self, other: &Metrics) -> Self {
        let mut diff = *self;
        diff.add(&other.scaled(Decimal::NEGATIVE_ONE));
        diff
    }
}

/// Instrument return minus sector return, per window (simple difference)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelativeMetrics {
    pub returns: [Decimal; 4],
}

impl RelativeMetrics {
    pub fn between(instrument: &Metrics, sector: &Metrics) -> Self {
        let mut returns = [Decimal::ZERO; 4];
        for window in Window::ALL {
            returns[window.index()] = instrument.window(window) - sector.window(window);
        }
        Self { returns }
    }

    pub fn window(&self, window: Window) -> Decimal {
        self.returns[window.index()]
    }
}

/// Anything carrying absolute and relative performance
pub trait Performance {
    fn metrics(&self) -> &Metrics;
    fn relative(&self) -> &RelativeMetrics;

    /// % change since average entry quote, for holdings
    fn since_entry(&self) -> Option<Decimal> {
        None
    }

    /// Warehouse region, when the row has one
    fn region(&self) -> Option<&str> {
        None
    }
}

/// Regional universe a holding is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Universe {
    Us,
    Eu,
}

impl Universe {
    /// Map a warehouse region (`dr_class_level_2`) to its universe.
    pub fn from_region(region: &str) -> Option<Self> {
        match region.trim().to_ascii_uppercase().as_str() {
            "NORTH AMERICA" | "US" => Some(Universe::Us),
            "EU" => Some(Universe::Eu),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Universe::Us => "US",
            Universe::Eu => "EU",
        }
    }
}

/// Dated close prices, ascending by date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    pub name: String,
    points: Vec<(NaiveDate, Decimal)>,
}

impl PriceSeries {
    /// Sorts by date; for duplicate dates the last value wins.
    pub fn new(name: impl Into<String>, mut points: Vec<(NaiveDate, Decimal)>) -> Self {
        points.sort_by_key(|(date, _)| *date);
        let mut deduped: Vec<(NaiveDate, Decimal)> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.0 == point.0 => *last = point,
                _ => deduped.push(point),
            }
        }
        Self {
            name: name.into(),
            points: deduped,
        }
    }

    pub fn points(&self) -> &[(NaiveDate, Decimal)] {
        &self.points
    }

    pub fn prices(&self) -> Vec<Decimal> {
        self.points.iter().map(|(_, p)| *p).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn last(&self) -> Option<(NaiveDate, Decimal)> {
        self.points.last().copied()
    }

    /// Base price for the window, or None when the series is too short.
    fn base(&self, window: Window) -> Option<Decimal> {
        let (last_date, _) = self.last()?;
        let n = self.points.len();
        match window {
            Window::OneDay | Window::FiveDays => {
                let lag = if window == Window::OneDay { 1 } else { 5 };
                n.checked_sub(lag + 1).map(|i| self.points[i].1)
            }
            Window::OneMonth => {
                let anchor = last_date.checked_sub_months(Months::new(1))?;
                self.points
                    .iter()
                    .rev()
                    .find(|(date, _)| *date <= anchor)
                    .map(|(_, p)| *p)
            }
            Window::YearToDate => {
                let start = NaiveDate::from_ymd_opt(last_date.year(), 1, 1)?;
                self.points
                    .iter()
                    .find(|(date, _)| *date >= start)
                    .map(|(_, p)| *p)
            }
        }
    }

    /// Percentage change of the last price against the window's base price.
    pub fn trailing_return(&self, window: Window) -> Option<Decimal> {
        let (_, current) = self.last()?;
        let base = self.base(window)?;
        super::pct_change(base, current)
    }

    pub fn window_returns(&self) -> [Option<Decimal>; 4] {
        Window::ALL.map(|w| self.trailing_return(w))
    }
}

/// Ordered table of metrics keyed by row label (sector, region)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricTable {
    pub index_name: String,
    pub rows: Vec<(String, Metrics)>,
}

impl MetricTable {
    pub fn new(index_name: impl Into<String>, rows: Vec<(String, Metrics)>) -> Self {
        Self {
            index_name: index_name.into(),
            rows,
        }
    }

    pub fn get(&self, label: &str) -> Option<&Metrics> {
        self.rows.iter().find(|(l, _)| l == label).map(|(_, m)| m)
    }

    pub fn require(&self, label: &str) -> Result<&Metrics> {
        self.get(label)
            .ok_or_else(|| BriefingError::missing("sector", label).into())
    }

    pub fn last(&self) -> Option<&(String, Metrics)> {
        self.rows.last()
    }

    /// Bare sector name -> row label, for tables keyed by numbered labels
    fn name_index(&self) -> HashMap<&str, &str> {
        self.rows
            .iter()
            .map(|(label, _)| (strip_code(label), label.as_str()))
            .collect()
    }
}

/// One constituent contributing to a sector aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct SectorMember {
    pub sector: String,
    pub market_cap: Decimal,
    pub metrics: Metrics,
}

/// Market-cap weighted average of each metric per sector, sorted by sector label.
pub fn sector_aggregate(members: &[SectorMember], index_name: &str) -> MetricTable {
    let mut groups: BTreeMap<&str, Vec<&SectorMember>> = BTreeMap::new();
    for member in members {
        groups.entry(member.sector.as_str()).or_default().push(member);
    }

    let rows = groups
        .into_iter()
        .map(|(sector, group)| {
            let total_cap: Decimal = group.iter().map(|m| m.market_cap).sum();
            let mut weighted = Metrics::default();
            if total_cap.is_zero() {
                warn!("Sector '{}' has zero total market cap, aggregate left at zero", sector);
            } else {
                for member in &group {
                    weighted.add(&member.metrics.scaled(member.market_cap / total_cap));
                }
            }
            (sector.to_string(), weighted)
        })
        .collect();

    MetricTable::new(index_name, rows)
}

/// Universe constituent with its sector
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniverseMember {
    pub name: String,
    pub sector: String,
    pub metrics: Metrics,
    pub relative: RelativeMetrics,
}

impl Performance for UniverseMember {
    fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn relative(&self) -> &RelativeMetrics {
        &self.relative
    }
}

/// Attach "vs. Sector" deltas to every universe member.
///
/// Members carry bare sector names; the sector table is keyed by numbered
/// labels. Each member's sector is rewritten to the table's label.
pub fn universe_vs_sector(
    universe: Vec<UniverseMember>,
    sectors: &MetricTable,
) -> Result<Vec<UniverseMember>> {
    let by_name = sectors.name_index();

    universe
        .into_iter()
        .map(|mut member| {
            let label = by_name
                .get(strip_code(&member.sector))
                .copied()
                .ok_or_else(|| BriefingError::missing("sector", member.sector.clone()))?;
            let sector = sectors.require(label)?;
            member.relative = RelativeMetrics::between(&member.metrics, sector);
            member.sector = label.to_string();
            Ok(member)
        })
        .collect()
}

/// EU minus US for every row both tables share, plus the difference of the
/// two tables' last rows (their index totals).
pub fn sector_diff(us: &MetricTable, eu: &MetricTable) -> MetricTable {
    let mut rows: Vec<(String, Metrics)> = us
        .rows
        .iter()
        .filter_map(|(label, us_metrics)| {
            eu.get(label)
                .map(|eu_metrics| (label.clone(), eu_metrics.minus(us_metrics)))
        })
        .collect();

    if let (Some((eu_label, eu_last)), Some((us_label, us_last))) = (eu.last(), us.last()) {
        rows.push((format!("{} - {}", eu_label, us_label), eu_last.minus(us_last)));
    }

    MetricTable::new("GICS", rows)
}
