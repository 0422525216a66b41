//! CSV artifacts: one file per table under `<output>/<section dir>/`.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{Cell, ReportTable, Section};

/// Machine-readable cell text: plain decimals, no grouping or units.
pub fn plain_cell(cell: &Cell) -> String {
    match cell {
        Cell::Number(value) => value.round_dp(4).normalize().to_string(),
        Cell::Text(text) => text.clone(),
        Cell::Empty => String::new(),
    }
}

pub fn write_table(table: &ReportTable, path: &Path) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let header = std::iter::once(table.index_name.clone()).chain(table.columns.iter().map(|c| c.header()));
    writer.write_record(header)?;

    for row in &table.rows {
        let record = std::iter::once(row.label.clone()).chain(row.cells.iter().map(plain_cell));
        writer.write_record(record)?;
    }
    writer.flush()?;
    debug!("Wrote {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

/// Write every table of a section; returns the paths written.
pub fn export_section(section: &Section, root: &Path) -> Result<Vec<PathBuf>> {
    let dir = root.join(section.kind.dir());
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut written = Vec::with_capacity(section.tables.len());
    for table in &section.tables {
        let path = dir.join(format!("{}.csv", table.name));
        write_table(table, &path)?;
        written.push(path);
    }
    info!("Exported {} tables to {}", written.len(), dir.display());
    Ok(written)
}
