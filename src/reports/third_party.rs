//! Third-party funds and certificates per mandate group.

use anyhow::Result;
use tracing::debug;

use super::{metric_cells, Briefing, Column, ReportTable};
use crate::analytics::funds::{fund_holdings, group_funds};
use crate::db::AccountFilter;

fn fund_columns() -> Vec<Column> {
    let mut columns = Column::METRICS.to_vec();
    columns.extend([Column::LastPrice, Column::Aeq, Column::SinceAeq]);
    columns
}

impl Briefing<'_> {
    pub(crate) fn third_party(&mut self) -> Result<Vec<ReportTable>> {
        let groups = &self.config.third_party.groups;
        let patterns = groups.iter().map(|g| g.pattern.clone()).collect();
        let positions = self.positions.latest_positions(&AccountFilter::NameContains(patterns))?;
        let quotes = self.market.fund_quotes()?;
        let holdings = fund_holdings(&positions, &quotes);

        let tables = groups
            .iter()
            .map(|group| {
                let members: Vec<_> = holdings
                    .iter()
                    .filter(|h| h.account_name.contains(group.pattern.as_str()))
                    .cloned()
                    .collect();
                debug!("Group '{}': {} fund lines", group.label, members.len());

                let mut table = ReportTable::new(group.label.clone(), group.label.clone(), "Position Name", fund_columns());
                for fund in group_funds(&members) {
                    let mut cells = metric_cells(&fund.metrics);
                    cells.extend([fund.last_price.into(), fund.aeq.into(), fund.since_aeq.into()]);
                    table.push(fund.name, cells);
                }
                table
            })
            .collect();

        Ok(tables)
    }
}
