use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use briefing::cli::runner::{apply_overrides, output_options, to_internal_command};
use briefing::cli::Cli;
use briefing::config::Config;
use briefing::dispatcher::dispatch_command;

fn main() -> Result<()> {
    // Logs go to stderr so tables and JSON on stdout stay clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    apply_overrides(&cli, &mut config);

    let command = to_internal_command(cli.command.as_ref());
    dispatch_command(command, &config, output_options(&cli))
}
