mod app;
mod cli;
mod config;
mod effects;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use monitor_logging::{monitor_debug, LogDestination, DEFAULT_LOG_FILE};

use cli::Cli;

fn main() {
    if let Err(err) = run() {
        eprintln!("pai-monitor error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let log_file = PathBuf::from(DEFAULT_LOG_FILE);
    let (destination, level) = if cli.verbose {
        (LogDestination::Both(log_file), LevelFilter::Debug)
    } else {
        (LogDestination::File(log_file), LevelFilter::Info)
    };
    monitor_logging::initialize(&destination, level);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_PATH));
    let mut config = config::load_or_init(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    monitor_debug!("Effective config: {:?}", config);

    app::run(&config, cli.command)
}
