use crate::cli::{Cli, Commands};
use crate::commands::{Command, OutputOptions};
use crate::config::Config;
use crate::reports::SectionKind;

/// Convert clap `Commands` into the internal `commands::Command`.
/// No subcommand means the daily run.
pub fn to_internal_command(c: Option<&Commands>) -> Command {
    match c {
        None | Some(Commands::Run) => Command::Run,
        Some(Commands::Positioning) => Command::section(SectionKind::Positioning),
        Some(Commands::Allocation { mandate }) => Command::Section {
            kind: SectionKind::Allocation,
            mandate: mandate.clone(),
        },
        Some(Commands::Hedge { mandate }) => Command::Section {
            kind: SectionKind::Hedge,
            mandate: mandate.clone(),
        },
        Some(Commands::Drawdown) => Command::section(SectionKind::Drawdown),
        Some(Commands::Futures) => Command::section(SectionKind::Futures),
        Some(Commands::Risk) => Command::section(SectionKind::Risk),
        Some(Commands::ThirdParty) => Command::section(SectionKind::ThirdParty),
        Some(Commands::InitDb { path }) => Command::InitDb { path: path.clone() },
    }
}

/// Path flags win over the config file
pub fn apply_overrides(cli: &Cli, config: &mut Config) {
    if let Some(workbook) = &cli.workbook {
        config.workbook = workbook.clone();
    }
    if let Some(database) = &cli.database {
        config.database = database.clone();
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
}

pub fn output_options(cli: &Cli) -> OutputOptions {
    OutputOptions {
        json: cli.json,
        color: !cli.no_color,
        ..OutputOptions::default()
    }
}
