//! Daemon process management
//!
//! Handles the PID file and process control for the background daemon.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Polls of the process table while waiting for a stopped daemon to exit
const STOP_ATTEMPTS: u32 = 50;
const STOP_POLL: Duration = Duration::from_millis(100);

fn default_pid_file() -> PathBuf {
    dirs::runtime_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("todotxt-daemon")
        .join("todotxt-daemon.pid")
}

/// Daemon process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Where the running daemon records its process id
    #[serde(rename = "pid-file")]
    pub pid_file: PathBuf,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            pid_file: default_pid_file(),
        }
    }
}

/// Daemon process manager
#[derive(Debug)]
pub struct DaemonManager {
    pid_file: PathBuf,
}

impl Default for DaemonManager {
    fn default() -> Self {
        Self::new()
    }
}

impl DaemonManager {
    /// Create a new daemon manager with the default PID file location
    pub fn new() -> Self {
        Self::with_pid_file(default_pid_file())
    }

    /// Create a daemon manager from configuration
    pub fn from_config(config: &DaemonConfig) -> Self {
        Self::with_pid_file(config.pid_file.clone())
    }

    /// Create a daemon manager with a custom PID file path
    pub fn with_pid_file(pid_file: PathBuf) -> Self {
        debug!(?pid_file, "DaemonManager::with_pid_file: called");
        Self { pid_file }
    }

    /// Check if a daemon is running
    pub fn is_running(&self) -> bool {
        self.running_pid().is_some()
    }

    /// Get the running daemon's PID
    ///
    /// A PID file naming a dead process counts as not running.
    pub fn running_pid(&self) -> Option<u32> {
        let result = self.read_pid().filter(|&pid| is_process_running(pid));
        debug!(?result, "DaemonManager::running_pid: returning");
        result
    }

    fn read_pid(&self) -> Option<u32> {
        let contents = fs::read_to_string(&self.pid_file).ok()?;
        contents.trim().parse().ok()
    }

    fn write_pid(&self, pid: u32) -> Result<()> {
        debug!(pid, ?self.pid_file, "DaemonManager::write_pid: called");
        if let Some(parent) = self.pid_file.parent() {
            fs::create_dir_all(parent).context("Failed to create PID file directory")?;
        }

        let mut file = fs::File::create(&self.pid_file).context("Failed to create PID file")?;
        write!(file, "{}", pid).context("Failed to write PID")?;
        Ok(())
    }

    fn remove_pid_file(&self) -> Result<()> {
        if self.pid_file.exists() {
            fs::remove_file(&self.pid_file).context("Failed to remove PID file")?;
            debug!(path = ?self.pid_file, "Removed PID file");
        }
        Ok(())
    }

    /// Start the daemon in a detached child process
    ///
    /// `config_path` and `log_level` are forwarded so the child runs with the
    /// same configuration and verbosity as the invoking command.
    pub fn start(&self, config_path: Option<&Path>, log_level: Option<&str>) -> Result<u32> {
        debug!(?config_path, ?log_level, "DaemonManager::start: called");
        if let Some(pid) = self.running_pid() {
            return Err(eyre::eyre!("Daemon already running with PID {}", pid));
        }

        info!("Starting daemon...");
        let exe = std::env::current_exe().context("Failed to get current executable")?;

        let child = daemon_command(&exe, config_path, log_level)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to spawn daemon process")?;

        let pid = child.id();
        self.write_pid(pid)?;

        info!(pid, "Daemon started");
        Ok(pid)
    }

    /// Stop the daemon: SIGTERM, then SIGKILL if it has not exited in time
    pub fn stop(&self) -> Result<u32> {
        debug!("DaemonManager::stop: called");
        let pid = self.running_pid().ok_or_else(|| eyre::eyre!("Daemon is not running"))?;

        info!(pid, "Stopping daemon...");
        send_signal(pid, Signal::Terminate)?;

        let mut attempts = 0;
        while is_process_running(pid) && attempts < STOP_ATTEMPTS {
            std::thread::sleep(STOP_POLL);
            attempts += 1;
        }
        debug!(attempts, "DaemonManager::stop: waited for process");

        if is_process_running(pid) {
            warn!(pid, "Daemon did not stop gracefully, sending SIGKILL");
            let _ = send_signal(pid, Signal::Kill);
        }

        self.remove_pid_file()?;
        info!(pid, "Daemon stopped");
        Ok(pid)
    }

    /// Register the current process as the daemon
    ///
    /// Called by the daemon process itself once it is running.
    pub fn register_self(&self) -> Result<()> {
        let pid = std::process::id();
        self.write_pid(pid)?;
        info!(pid, "Daemon registered");
        Ok(())
    }

    /// Remove the PID file if it still names the current process
    pub fn unregister(&self) -> Result<()> {
        match self.read_pid() {
            Some(pid) if pid == std::process::id() => self.remove_pid_file(),
            other => {
                debug!(?other, "DaemonManager::unregister: PID file belongs to another process");
                Ok(())
            }
        }
    }

    /// Get the PID file path
    pub fn pid_file(&self) -> &PathBuf {
        &self.pid_file
    }

    /// Get the daemon status
    pub fn status(&self) -> DaemonStatus {
        let pid = self.running_pid();
        DaemonStatus {
            running: pid.is_some(),
            pid,
            pid_file: self.pid_file.clone(),
        }
    }
}

/// Daemon status information
#[derive(Debug)]
pub struct DaemonStatus {
    /// Whether the daemon is running
    pub running: bool,
    /// Process ID (if running)
    pub pid: Option<u32>,
    /// PID file path
    pub pid_file: PathBuf,
}

/// The `run-daemon` invocation of `exe` with the global options it needs
fn daemon_command(exe: &Path, config_path: Option<&Path>, log_level: Option<&str>) -> Command {
    let mut command = Command::new(exe);
    if let Some(path) = config_path {
        command.arg("--config").arg(path);
    }
    if let Some(level) = log_level {
        command.arg("--log-level").arg(level);
    }
    command.arg("run-daemon");
    command
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Terminate,
    Kill,
}

#[cfg(unix)]
fn send_signal(pid: u32, which: Signal) -> Result<()> {
    use nix::sys::signal::{Signal as NixSignal, kill};
    use nix::unistd::Pid;

    let sig = match which {
        Signal::Terminate => NixSignal::SIGTERM,
        Signal::Kill => NixSignal::SIGKILL,
    };
    debug!(pid, ?sig, "send_signal: called");
    kill(Pid::from_raw(pid as i32), sig).with_context(|| format!("Failed to send {} to {}", sig, pid))
}

#[cfg(not(unix))]
fn send_signal(pid: u32, _signal: Signal) -> Result<()> {
    Command::new("taskkill")
        .args(["/PID", &pid.to_string(), "/F"])
        .output()
        .context("Failed to kill process")?;
    Ok(())
}

/// Check if a process with the given PID is running
fn is_process_running(pid: u32) -> bool {
    #[cfg(unix)]
    {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;
        // Signal 0 checks existence without affecting the process
        kill(Pid::from_raw(pid as i32), None).is_ok()
    }

    #[cfg(not(unix))]
    {
        Command::new("tasklist")
            .args(["/FI", &format!("PID eq {}", pid), "/NH"])
            .output()
            .map(|o| !o.stdout.is_empty() && !String::from_utf8_lossy(&o.stdout).contains("No tasks"))
            .unwrap_or(false)
    }
}
