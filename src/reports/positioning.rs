//! Regions & sectors: regional indices, EU and US sector performance, and
//! EU minus US.

use anyhow::Result;

use super::{Briefing, ReportTable};
use crate::analytics::performance::{sector_diff, Universe};

impl Briefing<'_> {
    pub(crate) fn positioning(&mut self) -> Result<Vec<ReportTable>> {
        let regions = self.market.regions()?;
        let eu = self.sectors(Universe::Eu)?;
        let us = self.sectors(Universe::Us)?;
        let diff = sector_diff(&us, &eu);

        Ok(vec![
            ReportTable::from_metrics("Regions", "Regionen", &regions),
            ReportTable::from_metrics("EU", "EU", &eu),
            ReportTable::from_metrics("US", "US", &us),
            ReportTable::from_metrics("EU_vs_US", "EU vs. US", &diff),
        ])
    }
}
