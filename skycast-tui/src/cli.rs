use clap::{Parser, Subcommand};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Terminal weather dashboard")]
pub struct Cli {
    /// City to show on startup, instead of the configured default.
    /// Also disables the one-shot geolocation.
    #[arg(long)]
    pub city: Option<String>,

    /// Skip the one-shot IP geolocation on startup.
    #[arg(long)]
    pub no_locate: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,
}
