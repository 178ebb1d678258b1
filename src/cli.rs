use crate::config::DEFAULT_CONFIG_DIR;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "waybar-gcal", version, about = "Google Calendar status item for Waybar")]
pub struct Cli {
    /// Directory holding credentials.json and token.json (${HOME} is expanded)
    #[arg(
        long,
        global = true,
        env = "WAYBAR_GCAL_CONFIG_DIR",
        default_value = DEFAULT_CONFIG_DIR
    )]
    pub config_dir: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print today's next event in Waybar JSON format
    Run {
        /// Calendar identifier (see `list` for available calendars)
        #[arg(long, env = "WAYBAR_GCAL_CALENDAR")]
        calendar: Option<String>,
    },
    /// Authorize access and store the token
    Setup {
        /// Only print the authorization URL instead of opening a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// List available calendars
    List,
}
