//! Binary crate for the `skycast` terminal weather dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration
//! - The event loop binding geolocation, search input, and fetch outcomes
//!   into one view state

use std::io::{self, Stdout};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use skycast_core::{Config, OpenWeatherClient, geolocate};

use crate::app::{AppState, Command, Event};

mod app;
mod cli;
mod event;
mod ui;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    match cli.command {
        Some(cli::Command::Configure) => configure(),
        None => run(cli).await,
    }
}

/// Interactive counterpart of editing the config file by hand.
fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(key.trim().to_string());
    config.save()?;

    println!("Saved API key to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn run(cli: cli::Cli) -> Result<()> {
    let config = Config::load()?;
    let api_key = config.resolve_api_key()?;
    init_logging()?;

    let client = OpenWeatherClient::new(api_key)?;
    let default_city = cli.city.as_deref().unwrap_or_else(|| config.default_city());

    let (tx, rx) = mpsc::unbounded_channel();
    let mut events = event::Events::new(rx);

    let (mut state, boot) = AppState::new(default_city);
    dispatch(boot, &client, &tx);

    // One-shot geolocation; an explicit --city pins the target instead.
    if !cli.no_locate && cli.city.is_none() {
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(position) = geolocate::locate().await {
                let _ = tx.send(Event::Located(position));
            }
        });
    }

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut state, &mut events, &client, &tx).await;
    restore_terminal(&mut terminal)?;

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut AppState,
    events: &mut event::Events,
    client: &OpenWeatherClient,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    loop {
        terminal
            .draw(|frame| ui::draw(frame, state))
            .context("Failed to draw frame")?;

        let Some(event) = events.next().await else {
            return Ok(());
        };

        if let Some(command) = state.handle_event(event) {
            if !dispatch(command, client, tx) {
                return Ok(());
            }
        }
    }
}

/// Perform a state-machine command. Returns `false` on quit.
fn dispatch(
    command: Command,
    client: &OpenWeatherClient,
    tx: &mpsc::UnboundedSender<Event>,
) -> bool {
    match command {
        Command::Quit => false,
        Command::Fetch { target, generation } => {
            let client = client.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                tracing::debug!(%target, generation, "starting fetch");
                let outcome = client.fetch(&target).await;
                let _ = tx.send(Event::Fetched { generation, outcome });
            });
            true
        }
    }
}

fn init_logging() -> Result<()> {
    let log_dir = Config::log_dir()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::never(&log_dir, "skycast.log");
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(appender)
        .with_ansi(false)
        .init();

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    // Leave the terminal usable if a draw or event handler panics.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));

    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to restore cursor")?;
    Ok(())
}
