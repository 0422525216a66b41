//! Futures positions overview across all equity mandates.

use anyhow::Result;
use std::collections::HashMap;
use tracing::info;

use super::{Briefing, Cell, Column, ReportTable};
use crate::analytics::futures::futures_overview;
use crate::analytics::performance::PriceSeries;
use crate::db::AccountFilter;

const OVERVIEW_COLUMNS: [Column; 8] = [
    Column::Account,
    Column::Aeq,
    Column::SinceAeq,
    Column::Volume,
    Column::PositionType,
    Column::Pnl,
    Column::Exposure,
    Column::Underlying,
];

impl Briefing<'_> {
    pub(crate) fn futures(&mut self) -> Result<Vec<ReportTable>> {
        let ids = self.config.mandates.values().copied().collect();
        let positions = self.positions.latest_positions(&AccountFilter::Segments(ids))?;

        let prices: HashMap<String, PriceSeries> = self
            .futures_series()?
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();

        let overview = futures_overview(&positions, &prices, self.config)?;
        info!("{} active future positions", overview.len());

        let mut table = ReportTable::new(
            "Positions_Overview",
            "Aktuelle Future Positionen",
            "Position Name",
            OVERVIEW_COLUMNS.to_vec(),
        );
        for row in &overview {
            table.push(
                row.name.clone(),
                vec![
                    Cell::from(row.account_name.as_str()),
                    row.aeq.into(),
                    row.since_aeq.into(),
                    row.volume.into(),
                    Cell::from(row.position_type.as_str()),
                    row.pnl.into(),
                    row.exposure.into(),
                    Cell::from(row.underlying.as_str()),
                ],
            );
        }
        Ok(vec![table])
    }
}
