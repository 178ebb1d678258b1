use clap::Parser;
use tracing::debug;
use waybar_gcal::cli::Cli;
use waybar_gcal::config::Config;
use waybar_gcal::{commands, startup};

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    // Load .env file if it exists, before clap reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    startup::init_logging()?;
    debug!(command = ?cli.command, "Starting waybar-gcal");

    let config = Config::load(&cli.config_dir)?;

    // Failures are reported once, by miette's handler on stderr
    commands::execute(cli.command, &config).await?;

    Ok(())
}
