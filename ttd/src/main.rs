//! ttd - todo.txt archiving daemon
//!
//! CLI entry point for running and managing the daemon.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use todotxt_daemon::cli::{Cli, Command, get_log_path, log_dir};
use todotxt_daemon::clock::{Clock, SystemClock};
use todotxt_daemon::config::Config;
use todotxt_daemon::daemon::DaemonManager;
use todotxt_daemon::lifetime::Lifetime;
use todotxt_daemon::mover::{MoveOutcome, Mover};
use todotxt_daemon::watcher::{StateFile, Watcher};
use todotxt_daemon::worker::{StopReason, Worker};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_dir = log_dir();
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(get_log_path())
        .context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;
    config.validate()?;

    let daemon = DaemonManager::from_config(&config.daemon);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Start { foreground } => {
            cmd_start(&config, &daemon, cli.config.as_deref(), cli.log_level.as_deref(), foreground).await
        }
        Command::Stop => cmd_stop(&daemon),
        Command::Status => cmd_status(&config, &daemon),
        Command::Move => cmd_move(&config),
        Command::Reset => cmd_reset(&config),
        Command::Logs { lines } => cmd_logs(lines),
        Command::RunDaemon => run_daemon(&config, &daemon).await,
    }
}

fn clock(config: &Config) -> Arc<dyn Clock> {
    Arc::new(SystemClock::with_offset_hours(config.watcher.day_offset_hours))
}

/// Start the daemon
async fn cmd_start(
    config: &Config,
    daemon: &DaemonManager,
    config_path: Option<&Path>,
    log_level: Option<&str>,
    foreground: bool,
) -> Result<()> {
    debug!(foreground, "cmd_start: called");
    if let Some(pid) = daemon.running_pid() {
        println!("ttd is already running (PID: {})", pid);
        return Ok(());
    }

    if foreground {
        println!("Starting ttd in foreground mode...");
        run_daemon(config, daemon).await
    } else {
        let pid = daemon.start(config_path, log_level)?;
        println!("ttd started (PID: {})", pid);
        Ok(())
    }
}

/// Stop the daemon
fn cmd_stop(daemon: &DaemonManager) -> Result<()> {
    if !daemon.is_running() {
        println!("ttd is not running");
        return Ok(());
    }

    let pid = daemon.stop()?;
    println!("ttd stopped (was PID: {})", pid);
    Ok(())
}

/// Show daemon status and the daily gate
fn cmd_status(config: &Config, daemon: &DaemonManager) -> Result<()> {
    let status = daemon.status();
    match status.pid {
        Some(pid) => println!("Daemon:   running (PID: {})", pid),
        None => println!("Daemon:   not running"),
    }
    println!("PID file: {}", status.pid_file.display());

    let clock = clock(config);
    let today = clock.today();
    let mut watcher = Watcher::new(clock, StateFile::new(config.state_file()));
    let due = watcher.is_time_to_run()?;

    println!("State:    {}", watcher.store().path().display());
    match watcher.last_run().filter(|day| *day != chrono::NaiveDate::MIN) {
        Some(day) => println!("Last run: {}", day),
        None => println!("Last run: never"),
    }
    println!("Today:    {} ({})", today, if due { "run due" } else { "done" });
    Ok(())
}

/// Run the mover once, bypassing the daily gate
fn cmd_move(config: &Config) -> Result<()> {
    let mover = Mover::new(config.clone(), clock(config));
    match mover.run()? {
        MoveOutcome::NothingToMove => println!("No tasks to move"),
        MoveOutcome::Moved { count, date } => println!("Moved {} task(s) dated {}", count, date),
    }
    Ok(())
}

/// Delete the run-state record
fn cmd_reset(config: &Config) -> Result<()> {
    let state = StateFile::new(config.state_file());
    if state.remove()? {
        info!(path = %state.path().display(), "Run state reset");
        println!("Removed {}", state.path().display());
    } else {
        println!("No run state at {}", state.path().display());
    }
    Ok(())
}

/// Print the last `lines` lines of the log file
fn cmd_logs(lines: usize) -> Result<()> {
    let log_path = get_log_path();
    if !log_path.exists() {
        println!("No log file found at: {}", log_path.display());
        return Ok(());
    }

    let file = fs::File::open(&log_path).context("Failed to open log file")?;
    let all_lines: Vec<String> = BufReader::new(file).lines().map_while(Result::ok).collect();
    let start = all_lines.len().saturating_sub(lines);
    for line in &all_lines[start..] {
        println!("{}", line);
    }
    Ok(())
}

/// Run the worker until a signal arrives or it stops on its own
///
/// The PID file is removed on every exit path once registered.
async fn run_daemon(config: &Config, daemon: &DaemonManager) -> Result<()> {
    debug!("run_daemon: called");
    daemon.register_self()?;

    let result = supervise(config).await;
    if let Err(e) = daemon.unregister() {
        warn!(error = %e, "Failed to remove PID file");
    }
    result
}

async fn supervise(config: &Config) -> Result<()> {
    let clock = clock(config);
    let watcher = Watcher::new(clock.clone(), StateFile::new(config.state_file()));
    let mover = Mover::new(config.clone(), clock);
    let lifetime = Lifetime::new();

    let worker = Worker::new(config.worker.clone(), watcher, mover, lifetime.clone());
    let handle = tokio::spawn(worker.run());

    let shutdown = wait_for_shutdown(&lifetime).await;
    lifetime.request_stop();

    let report = handle.await.context("Worker task failed")?;
    shutdown?;
    info!(
        iterations = report.iterations,
        runs = report.runs,
        tasks_moved = report.tasks_moved,
        recovered = report.recovered,
        "Worker finished"
    );

    match report.stop {
        StopReason::Cancelled => Ok(()),
        StopReason::Fatal(message) => Err(eyre::eyre!("Daemon stopped after a fatal error: {}", message)),
    }
}

/// Resolve on SIGINT, SIGTERM, or a stop requested by the worker
async fn wait_for_shutdown(lifetime: &Lifetime) -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => warn!("SIGINT received"),
            _ = sigterm.recv() => warn!("SIGTERM received"),
            _ = lifetime.stopped() => debug!("run_daemon: worker requested stop"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                warn!("Ctrl+C received");
            }
            _ = lifetime.stopped() => debug!("run_daemon: worker requested stop"),
        }
    }

    Ok(())
}
