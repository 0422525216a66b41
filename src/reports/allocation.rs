//! Allocation vs. blended benchmark, and the currency hedge table.

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::{Briefing, Cell, Column, ReportTable};
use crate::analytics::allocation::{allocation, AllocationRow, ComparisonTable};
use crate::analytics::benchmark::{combine, Basket};
use crate::analytics::exposure::{hedge_exposure, CurrencyExposure};
use crate::analytics::performance::Universe;
use crate::db::{AccountFilter, AssetClass};
use crate::utils::file_stem;

fn comparison_table(name: &str, title: String, table: &ComparisonTable) -> ReportTable {
    let mut report = ReportTable::new(name, title, table.index_name.clone(), Column::COMPARISON.to_vec());
    for row in &table.rows {
        report.push(
            row.label.clone(),
            vec![row.benchmark.into(), row.portfolio.into(), row.difference.into()],
        );
    }
    report
}

fn hedge_cells(row: &CurrencyExposure) -> Vec<Cell> {
    vec![
        row.stocks.into(),
        row.cash.into(),
        row.futures.into(),
        row.forex.into(),
        row.sum.into(),
    ]
}

impl Briefing<'_> {
    fn mandate_name(&self, mandate: Option<&str>) -> String {
        mandate
            .map(str::to_string)
            .unwrap_or_else(|| self.config.allocation.mandate.clone())
    }

    /// Blended benchmark basket, EU and US weighted per config
    fn benchmark(&mut self) -> Result<Basket> {
        let settings = &self.config.allocation;
        let capital = settings.basket_capital;
        let (eu_weight, us_weight) = (settings.eu_weight, settings.us_weight);

        let eu = Basket::equal_notional(&self.market.constituents(Universe::Eu)?, capital)
            .context("Failed to build EU benchmark basket")?;
        let us = Basket::equal_notional(&self.market.constituents(Universe::Us)?, capital)
            .context("Failed to build US benchmark basket")?;
        Ok(combine(&eu, &us, eu_weight, us_weight))
    }

    pub(crate) fn allocation(&mut self, mandate: Option<&str>) -> Result<Vec<ReportTable>> {
        let name = self.mandate_name(mandate);
        let id = self.config.mandate_id(&name)?;
        let positions = self.positions.latest_positions(&AccountFilter::segment(id))?;
        info!("Allocation for '{}' over {} positions", name, positions.len());

        let rows = AllocationRow::from_positions(&positions)?;
        let has_futures = rows.iter().any(|r| r.asset_class == AssetClass::Future);
        let lookthrough = if has_futures {
            self.market.sector_lookthrough()?
        } else {
            Default::default()
        };

        let benchmark = self.benchmark()?;
        let report = allocation(rows, &benchmark, &lookthrough, self.config.allocation.region_threshold);

        let stem = file_stem(&name);
        let mut tables = vec![
            comparison_table(&format!("Sector_Exposure_{}", stem), format!("{} nach Sektoren", name), &report.sector),
            comparison_table(&format!("Region_All_Exposure_{}", stem), format!("{} alle Regionen", name), &report.region_all),
            comparison_table(&format!("Region_Exposure_{}", stem), format!("{} nach Regionen", name), &report.region),
            comparison_table(&format!("US_Stocks_Exposure_{}", stem), format!("{} US Sektoren", name), &report.us_sector),
            comparison_table(&format!("EU_Stocks_Exposure_{}", stem), format!("{} EU Sektoren", name), &report.eu_sector),
        ];
        tables.push(self.hedge(Some(&name))?);
        Ok(tables)
    }

    pub(crate) fn hedge(&mut self, mandate: Option<&str>) -> Result<ReportTable> {
        let name = self.mandate_name(mandate);
        let id = self.config.mandate_id(&name)?;
        let positions = self.positions.latest_positions(&AccountFilter::segment(id))?;
        let hedge = hedge_exposure(&positions).with_context(|| format!("Hedge table for '{}'", name))?;

        if !hedge.unclassified.is_empty() {
            warn!(
                "{} positions of '{}' fall outside the hedge buckets: {}",
                hedge.unclassified.len(),
                name,
                hedge.unclassified.join(", ")
            );
        }

        let mut table = ReportTable::new(
            format!("Hedge_{}", file_stem(&name)),
            format!("Currency Exposure {}", name),
            "Currency",
            Column::HEDGE.to_vec(),
        );
        for row in &hedge.rows {
            table.push(row.currency.clone(), hedge_cells(row));
        }
        table.push("Total", hedge_cells(&hedge.total));
        Ok(table)
    }
}
