//! Command dispatcher: opens the data sources, builds the requested
//! sections and hands them to the formatters and the CSV exporter.

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::info;

use crate::cli::formatters::{format_artifacts, format_section, format_sections_json};
use crate::commands::{Command, OutputOptions};
use crate::config::Config;
use crate::db::{self, PositionSource, SqliteWarehouse};
use crate::importers::{MarketData, XlsxWorkbook};
use crate::reports::export::export_section;
use crate::reports::{Briefing, Section};

/// Route a resolved command to its handler
pub fn dispatch_command(command: Command, config: &Config, options: OutputOptions) -> Result<()> {
    if !options.color {
        colored::control::set_override(false);
    }

    if let Command::InitDb { path } = &command {
        db::init_database(path)?;
        if !options.json {
            println!("{} Initialized warehouse schema at {}", "✓".green().bold(), path.display());
        }
        return Ok(());
    }

    let warehouse = open_warehouse(config)?;
    let sections = build_sections(&command, config, &warehouse, open_market(config)?)?;
    present(&sections, config, options)
}

fn open_warehouse(config: &Config) -> Result<SqliteWarehouse> {
    SqliteWarehouse::open(&config.database)
        .with_context(|| format!("Failed to open warehouse {}", config.database.display()))
}

fn open_market(config: &Config) -> Result<MarketData> {
    let workbook = XlsxWorkbook::open(&config.workbook)
        .with_context(|| format!("Failed to open market data workbook {}", config.workbook.display()))?;
    Ok(MarketData::new(Box::new(workbook)))
}

/// Print, then write the artifacts
fn present(sections: &[Section], config: &Config, options: OutputOptions) -> Result<()> {
    let mut written = Vec::new();
    if options.export {
        for section in sections {
            written.extend(export_section(section, &config.output_dir)?);
        }
        info!("{} artifacts under {}", written.len(), config.output_dir.display());
    }

    if options.json {
        println!("{}", format_sections_json(sections));
    } else {
        for section in sections {
            print!("{}", format_section(section));
        }
        print!("{}", format_artifacts(&written));
    }
    Ok(())
}

/// Sections of a command over already opened sources, without printing
pub fn build_sections(
    command: &Command,
    config: &Config,
    positions: &dyn PositionSource,
    market: MarketData,
) -> Result<Vec<Section>> {
    let mut briefing = Briefing::new(config, positions, market);
    match command {
        Command::Run => briefing.run_all(),
        Command::Section { kind, mandate } => Ok(vec![briefing.section(*kind, mandate.as_deref())?]),
        Command::InitDb { .. } => Ok(Vec::new()),
    }
}
