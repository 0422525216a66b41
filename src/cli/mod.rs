use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;
pub mod runner;

#[derive(Parser)]
#[command(name = "briefing")]
#[command(version, about = "Daily portfolio briefing for equity mandates")]
#[command(
    long_about = "Build the daily portfolio briefing: regional and sector positioning, allocation vs. a blended benchmark, currency hedge, futures drawdowns, risk screens and third-party fund overviews. Tables are printed and written as CSV artifacts."
)]
pub struct Cli {
    /// Config file (default: <config_home>/briefing/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Market data workbook, overrides the config
    #[arg(long, global = true)]
    pub workbook: Option<PathBuf>,

    /// Position warehouse (SQLite), overrides the config
    #[arg(long = "db", global = true)]
    pub database: Option<PathBuf>,

    /// Artifact directory, overrides the config
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run every daily section and write all artifacts (default)
    Run,

    /// Regional and sector performance, EU vs. US
    Positioning,

    /// Sector and region allocation against the blended benchmark
    Allocation {
        /// Mandate name (default: allocation.mandate from the config)
        #[arg(short, long)]
        mandate: Option<String>,
    },

    /// Currency exposure of a mandate by bucket
    Hedge {
        /// Mandate name (default: allocation.mandate from the config)
        #[arg(short, long)]
        mandate: Option<String>,
    },

    /// Drawdown and drawup of every futures underlying
    Drawdown,

    /// Open futures positions across mandates
    Futures,

    /// Underperforming holdings per mandate
    Risk,

    /// Third-party funds and certificates per mandate group
    ThirdParty,

    /// Create an empty warehouse schema
    InitDb {
        /// Path of the SQLite file to create
        path: PathBuf,
    },
}
