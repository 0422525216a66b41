//! Risk management: underperforming holdings per mandate and the quantile
//! thresholds behind the screen.

use anyhow::Result;
use std::collections::BTreeMap;

use super::{metric_cells, Briefing, Cell, Column, ReportTable};
use crate::analytics::holdings::{enrich_stock_positions, positions_vs_sector, Holding};
use crate::analytics::outliers::{screen, QuantileTable, ThresholdSelector};
use crate::analytics::performance::{Performance, Universe};
use crate::db::AccountFilter;
use crate::utils::file_stem;

fn holding_columns() -> Vec<Column> {
    let mut columns = vec![
        Column::Sector,
        Column::Aeq,
        Column::Volume,
        Column::LastPrice,
        Column::SinceAeq,
    ];
    columns.extend(Column::METRICS);
    columns.extend(Column::VS_SECTOR);
    columns
}

fn holding_cells(holding: &Holding) -> Vec<Cell> {
    let mut cells = vec![
        Cell::from(holding.sector.as_deref()),
        holding.aeq.into(),
        holding.volume.into(),
        holding.last_price.into(),
        holding.since_aeq.into(),
    ];
    cells.extend(metric_cells(holding.metrics()));
    cells.extend(holding.relative().returns.iter().map(|r| Cell::Number(*r)));
    cells
}

fn quantile_table(universe: Universe, table: &QuantileTable) -> ReportTable {
    let mut report = ReportTable::new(
        format!("{}_Quantiles", universe.label()),
        format!("{} Quantile", universe.label()),
        "Metric",
        vec![Column::LowerQuantile, Column::UpperQuantile],
    );
    for (label, threshold) in table.labelled() {
        report.push(label, vec![threshold.lower.into(), threshold.upper.into()]);
    }
    report
}

impl Briefing<'_> {
    pub(crate) fn risk(&mut self) -> Result<Vec<ReportTable>> {
        let ids = self.config.mandates.values().copied().collect();
        let positions = self.positions.latest_positions(&AccountFilter::Segments(ids))?;
        let quotes = self.market.stock_quotes()?;

        let mut holdings = enrich_stock_positions(&positions, &quotes);
        let us_sectors = self.sectors(Universe::Us)?;
        let eu_sectors = self.sectors(Universe::Eu)?;
        positions_vs_sector(&mut holdings, &us_sectors, &eu_sectors)?;

        let us = self.quantiles(Universe::Us)?;
        let eu = self.quantiles(Universe::Eu)?;
        let entry_loss = Some(self.config.risk.entry_loss_threshold);

        let mut by_account: BTreeMap<String, Vec<Holding>> = BTreeMap::new();
        for holding in holdings {
            by_account.entry(holding.account_name.clone()).or_default().push(holding);
        }

        let mut tables = Vec::new();
        for (account, holdings) in &by_account {
            let outliers = screen(holdings, ThresholdSelector::ByRegion { us: &us, eu: &eu }, entry_loss);

            let mut negative = outliers.negative;
            negative.sort_by(|a, b| b.since_aeq.cmp(&a.since_aeq));

            let mut table = ReportTable::new(
                format!("{}_underperformed", file_stem(account)),
                account.clone(),
                "Position Name",
                holding_columns(),
            );
            for holding in &negative {
                table.push(holding.name.clone(), holding_cells(holding));
            }
            tables.push(table);
        }

        tables.push(quantile_table(Universe::Us, &us));
        tables.push(quantile_table(Universe::Eu, &eu));
        Ok(tables)
    }
}
