use crate::cli::Command;
use crate::config::Config;
use crate::error::AppResult;
use chrono::Local;
use std::io::{self, Write};
use tokio::io::BufReader;

pub mod list;
pub mod run;
pub mod setup;

/// Type alias for command result
pub type CommandResult = AppResult<()>;

/// Run a subcommand against stdin/stdout
pub async fn execute(command: Command, config: &Config) -> CommandResult {
    match command {
        Command::Run { calendar } => {
            let item = run::run(config, calendar.as_deref(), &Local::now()).await?;
            // Serialize before writing so a failure never leaves partial output
            let json = item.to_json()?;
            writeln!(io::stdout().lock(), "{}", json)?;
        }
        Command::Setup { no_browser } => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = io::stdout();
            setup::setup(config, stdin, &mut stdout, !no_browser).await?;
        }
        Command::List => {
            let lines = list::list(config).await?;
            let mut stdout = io::stdout().lock();
            for line in lines {
                writeln!(stdout, "{}", line)?;
            }
        }
    }
    Ok(())
}
