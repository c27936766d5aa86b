use chatterkit::cli::{self, Cli};
use chatterkit::init_logging;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.json_log)?;
    tracing::debug!(version = chatterkit::VERSION, build = chatterkit::BUILD_DATE, "starting");

    let config = cli::load_config(&cli)?;
    let report = cli::run(&cli.command, &config)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
