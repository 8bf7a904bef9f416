//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ttd - archive completed todo.txt tasks once per day
#[derive(Debug, Parser)]
#[command(
    name = "ttd",
    about = "Daemon that moves completed todo.txt tasks into done.txt once per day",
    version = crate::VERSION,
    after_help = "Logs are written to: ~/.local/share/todotxt-daemon/logs/todotxt-daemon.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the daemon in the background
    Start {
        /// Don't fork to background (run in foreground)
        #[arg(long)]
        foreground: bool,
    },

    /// Stop the running daemon
    Stop,

    /// Show daemon status and the last recorded run
    Status,

    /// Move completed tasks now, ignoring the daily gate
    Move,

    /// Forget the last recorded run so the next check is due
    Reset,

    /// Show daemon logs
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },

    /// Internal: Run as daemon process (used by `start`)
    #[command(hide = true)]
    RunDaemon,
}

/// Location of the daemon log file
pub fn get_log_path() -> PathBuf {
    log_dir().join("todotxt-daemon.log")
}

/// Directory holding the daemon log file
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("todotxt-daemon")
        .join("logs")
}
