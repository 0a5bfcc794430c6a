use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Watches download jobs on a PaiDownloader backend.
#[derive(Debug, Parser)]
#[command(name = "pai-monitor")]
#[command(about = "Start, follow and cancel PaiDownloader jobs from the terminal", long_about = None)]
pub struct Cli {
    /// Backend base URL; overrides `server_url` from the config file.
    #[arg(long, value_name = "URL")]
    pub server: Option<String>,

    /// Config file to read (created with defaults when missing).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Mirror logs to stderr at debug level.
    #[arg(short, long)]
    pub verbose: bool,

    /// Without a subcommand the interactive console starts.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// Start a job and follow it until it completes or fails.
    Start {
        /// Page whose resources should be downloaded.
        url: String,
        /// Resource categories to include (default: all).
        file_types: Vec<String>,
    },

    /// List the resources a job for this page would download.
    Preview {
        url: String,
        file_types: Vec<String>,
    },

    /// Show past jobs.
    History,
}
