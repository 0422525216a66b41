// Reports module - briefing sections built from the analytics core

pub mod allocation;
pub mod columns;
pub mod drawdown;
pub mod export;
pub mod futures;
pub mod positioning;
pub mod risk;
pub mod third_party;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

use crate::analytics::performance::{universe_vs_sector, MetricTable, Metrics, PriceSeries, Universe};
use crate::analytics::QuantileTable;
use crate::config::Config;
use crate::db::PositionSource;
use crate::importers::MarketData;

pub use columns::{Column, ColumnFormat, Style};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(Decimal),
    Text(String),
    Empty,
}

impl From<Decimal> for Cell {
    fn from(value: Decimal) -> Self {
        Cell::Number(value)
    }
}

impl From<Option<Decimal>> for Cell {
    fn from(value: Option<Decimal>) -> Self {
        value.map(Cell::Number).unwrap_or(Cell::Empty)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<Option<&str>> for Cell {
    fn from(value: Option<&str>) -> Self {
        value.map(Cell::from).unwrap_or(Cell::Empty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub label: String,
    pub cells: Vec<Cell>,
}

/// A named table of one report section
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    /// Artifact name, file-system safe
    pub name: String,
    pub title: String,
    pub index_name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<ReportRow>,
}

impl ReportTable {
    pub fn new(name: impl Into<String>, title: impl Into<String>, index_name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            index_name: index_name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, label: impl Into<String>, cells: Vec<Cell>) {
        debug_assert_eq!(cells.len(), self.columns.len());
        self.rows.push(ReportRow {
            label: label.into(),
            cells,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, label: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Cell by row label and column
    pub fn cell(&self, label: &str, column: Column) -> Option<&Cell> {
        let idx = self.columns.iter().position(|c| *c == column)?;
        self.row(label)?.cells.get(idx)
    }

    /// Table of the six market metrics, one row per label
    pub fn from_metrics(name: &str, title: &str, table: &MetricTable) -> Self {
        let mut report = Self::new(name, title, table.index_name.clone(), Column::METRICS.to_vec());
        for (label, metrics) in &table.rows {
            report.push(label.clone(), metric_cells(metrics));
        }
        report
    }
}

pub(crate) fn metric_cells(metrics: &Metrics) -> Vec<Cell> {
    let mut cells: Vec<Cell> = metrics.returns.iter().map(|r| Cell::Number(*r)).collect();
    cells.push(Cell::Number(metrics.mov_avg_200));
    cells.push(Cell::Number(metrics.high_52w));
    cells
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionKind {
    Positioning,
    Allocation,
    Hedge,
    Drawdown,
    Futures,
    Risk,
    ThirdParty,
}

impl SectionKind {
    /// Order of a full daily run
    pub const DAILY: [SectionKind; 6] = [
        SectionKind::Positioning,
        SectionKind::Allocation,
        SectionKind::Drawdown,
        SectionKind::Futures,
        SectionKind::Risk,
        SectionKind::ThirdParty,
    ];

    /// Output sub-directory
    pub fn dir(&self) -> &'static str {
        match self {
            SectionKind::Positioning => "positioning",
            SectionKind::Allocation | SectionKind::Hedge => "allocation",
            SectionKind::Drawdown | SectionKind::Futures => "futures",
            SectionKind::Risk => "risk",
            SectionKind::ThirdParty => "third_party",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Positioning => "Regionen & Sektoren",
            SectionKind::Allocation => "Aktuelle Allokation",
            SectionKind::Hedge => "Currency Exposure",
            SectionKind::Drawdown => "Drawdown",
            SectionKind::Futures => "Aktuelle Future Positionen",
            SectionKind::Risk => "Risikomanagement",
            SectionKind::ThirdParty => "Drittprodukte & Fonds",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    pub tables: Vec<ReportTable>,
}

impl Section {
    pub fn new(kind: SectionKind, tables: Vec<ReportTable>) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            tables,
        }
    }

    pub fn table(&self, name: &str) -> Option<&ReportTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// One briefing run: configuration, data sources, and the market tables
/// several sections share, loaded at most once.
pub struct Briefing<'a> {
    config: &'a Config,
    positions: &'a dyn PositionSource,
    market: MarketData,
    us_sectors: Option<MetricTable>,
    eu_sectors: Option<MetricTable>,
    futures: Option<Vec<PriceSeries>>,
    quantiles: HashMap<Universe, QuantileTable>,
}

impl<'a> Briefing<'a> {
    pub fn new(config: &'a Config, positions: &'a dyn PositionSource, market: MarketData) -> Self {
        Self {
            config,
            positions,
            market,
            us_sectors: None,
            eu_sectors: None,
            futures: None,
            quantiles: HashMap::new(),
        }
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    fn sectors(&mut self, universe: Universe) -> Result<MetricTable> {
        let cached = match universe {
            Universe::Us => &self.us_sectors,
            Universe::Eu => &self.eu_sectors,
        };
        if let Some(table) = cached {
            return Ok(table.clone());
        }

        let table = match universe {
            Universe::Us => self.market.us_sectors().context("Failed to load US sectors")?,
            Universe::Eu => self.market.eu_sectors().context("Failed to load EU sectors")?,
        };
        match universe {
            Universe::Us => self.us_sectors = Some(table.clone()),
            Universe::Eu => self.eu_sectors = Some(table.clone()),
        }
        Ok(table)
    }

    fn futures_series(&mut self) -> Result<Vec<PriceSeries>> {
        if let Some(series) = &self.futures {
            return Ok(series.clone());
        }
        let series = self.market.futures()?;
        self.futures = Some(series.clone());
        Ok(series)
    }

    /// Outlier thresholds of a universe, measured against its sector table
    fn quantiles(&mut self, universe: Universe) -> Result<QuantileTable> {
        if let Some(table) = self.quantiles.get(&universe) {
            return Ok(table.clone());
        }

        let sectors = self.sectors(universe)?;
        let members = self.market.universe(universe)?;
        let members = universe_vs_sector(members, &sectors)
            .with_context(|| format!("Failed to map {} universe onto sectors", universe.label()))?;

        let risk = &self.config.risk;
        let table = QuantileTable::from_rows(&members, risk.lower_quantile, risk.upper_quantile)?;
        self.quantiles.insert(universe, table.clone());
        Ok(table)
    }

    /// Build one section
    pub fn section(&mut self, kind: SectionKind, mandate: Option<&str>) -> Result<Section> {
        info!("Building section {:?}", kind);
        let tables = match kind {
            SectionKind::Positioning => self.positioning()?,
            SectionKind::Allocation => self.allocation(mandate)?,
            SectionKind::Hedge => vec![self.hedge(mandate)?],
            SectionKind::Drawdown => self.drawdown()?,
            SectionKind::Futures => self.futures()?,
            SectionKind::Risk => self.risk()?,
            SectionKind::ThirdParty => self.third_party()?,
        };
        Ok(Section::new(kind, tables))
    }

    /// Every daily section in order; the first failure aborts the run.
    pub fn run_all(&mut self) -> Result<Vec<Section>> {
        SectionKind::DAILY
            .iter()
            .map(|kind| {
                self.section(*kind, None)
                    .with_context(|| format!("Section {:?} failed", kind))
            })
            .collect()
    }
}
