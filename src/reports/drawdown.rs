//! Drawdown of every futures underlying.

use anyhow::Result;
use rust_decimal::Decimal;
use tracing::warn;

use super::{Briefing, Cell, Column, ReportTable};
use crate::analytics::drawdown::{summarize, track_series};
use crate::analytics::performance::Window;
use crate::utils::file_stem;

const DRAWDOWN_SERIES_COLUMNS: [Column; 4] = [Column::Peak, Column::Drawdown, Column::Trough, Column::Drawup];
const DRAWDOWN_SUMMARY_COLUMNS: [Column; 10] = [
    Column::Peak,
    Column::Drawdown,
    Column::MaxDrawdown,
    Column::Trough,
    Column::Drawup,
    Column::MaxDrawup,
    Column::Return(Window::OneDay),
    Column::Return(Window::FiveDays),
    Column::Return(Window::OneMonth),
    Column::Return(Window::YearToDate),
];

impl Briefing<'_> {
    /// Summary over all underlyings, then one dated table per underlying.
    /// Values are percentages.
    pub(crate) fn drawdown(&mut self) -> Result<Vec<ReportTable>> {
        let hundred = Decimal::ONE_HUNDRED;
        let mut summary = ReportTable::new(
            "Futures_Drawdown_Overview",
            "Drawdown",
            "Underlying",
            DRAWDOWN_SUMMARY_COLUMNS.to_vec(),
        );
        let mut tables = Vec::new();

        for series in self.futures_series()? {
            let points = track_series(&series);
            let Some(stats) = summarize(&points) else {
                warn!("Futures series '{}' is empty", series.name);
                continue;
            };

            let mut cells: Vec<Cell> = vec![
                stats.peak.into(),
                (stats.current_drawdown * hundred).into(),
                (stats.max_drawdown * hundred).into(),
                stats.trough.into(),
                (stats.current_drawup * hundred).into(),
                (stats.max_drawup * hundred).into(),
            ];
            // Windows the series is too short for stay empty
            cells.extend(series.window_returns().map(Cell::from));
            summary.push(series.name.clone(), cells);

            let mut table = ReportTable::new(
                format!("{}_drawdown", file_stem(&series.name)),
                series.name.clone(),
                "Date",
                DRAWDOWN_SERIES_COLUMNS.to_vec(),
            );
            for point in &points {
                table.push(
                    point.date.format("%Y-%m-%d").to_string(),
                    vec![
                        point.peak.into(),
                        (point.drawdown * hundred).into(),
                        point.trough.into(),
                        (point.drawup * hundred).into(),
                    ],
                );
            }
            tables.push(table);
        }

        tables.insert(0, summary);
        Ok(tables)
    }
}
