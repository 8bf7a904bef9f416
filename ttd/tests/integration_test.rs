//! Integration tests for todotxt-daemon
//!
//! These drive the worker against real files on disk.

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;
use todotxt_daemon::clock::{Clock, ManualClock};
use todotxt_daemon::config::{DONE_TXT_PATH, TODO_TXT_PATH};
use todotxt_daemon::lifetime::Lifetime;
use todotxt_daemon::mover::Mover;
use todotxt_daemon::watcher::{StateFile, Watcher};
use todotxt_daemon::worker::{StopReason, Worker, WorkerConfig, WorkerReport};

struct Workspace {
    dir: TempDir,
    settings: HashMap<String, String>,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut settings = HashMap::new();
        settings.insert(TODO_TXT_PATH.to_string(), path_str(dir.path().join("todo.txt")));
        settings.insert(DONE_TXT_PATH.to_string(), path_str(dir.path().join("done.txt")));
        Self { dir, settings }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) {
        fs::write(self.path(name), content).unwrap();
    }

    fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap()
    }

    fn worker(&self, clock: Arc<dyn Clock>, lifetime: Lifetime) -> Worker<Watcher<StateFile>, Mover<HashMap<String, String>>> {
        let watcher = Watcher::new(clock.clone(), StateFile::new(self.path("state.json")));
        let mover = Mover::new(self.settings.clone(), clock);
        Worker::new(WorkerConfig { interval_secs: 3600 }, watcher, mover, lifetime)
    }
}

fn path_str(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Let the worker run its first iteration, then stop it
async fn run_first_iteration(workspace: &Workspace, clock: Arc<dyn Clock>) -> WorkerReport {
    let lifetime = Lifetime::new();
    let handle = tokio::spawn(workspace.worker(clock, lifetime.clone()).run());

    tokio::time::sleep(Duration::from_millis(200)).await;
    lifetime.request_stop();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("Worker should stop")
        .unwrap()
}

#[tokio::test]
async fn test_first_run_moves_tasks_and_records_day() {
    let workspace = Workspace::new();
    workspace.write("todo.txt", "call mom\nx pay rent\nx water plants\n");
    workspace.write("done.txt", "2024-01-01 older task\n");

    let report = run_first_iteration(&workspace, Arc::new(ManualClock::new(noon()))).await;

    assert_eq!(report.runs, 1);
    assert_eq!(report.tasks_moved, 2);
    assert_eq!(report.stop, StopReason::Cancelled);
    assert_eq!(workspace.read("todo.txt"), "call mom\n");

    let done: Vec<String> = workspace.read("done.txt").lines().map(str::to_string).collect();
    assert_eq!(done.len(), 3);
    assert!(done[0].ends_with(" pay rent"));
    assert!(done[1].ends_with(" water plants"));
    assert_eq!(done[2], "2024-01-01 older task");

    assert_eq!(workspace.read("state.json"), r#"{"last_run":"2024-06-15T00:00:00"}"#);
}

#[tokio::test]
async fn test_already_ran_today_leaves_files_alone() {
    let workspace = Workspace::new();
    workspace.write("todo.txt", "x pay rent\n");
    workspace.write("done.txt", "");
    workspace.write("state.json", r#"{"last_run":"2024-06-15T00:00:00"}"#);

    let report = run_first_iteration(&workspace, Arc::new(ManualClock::new(noon()))).await;

    assert_eq!(report.iterations, 1);
    assert_eq!(report.runs, 0);
    assert_eq!(workspace.read("todo.txt"), "x pay rent\n");
    assert_eq!(workspace.read("done.txt"), "");
}

#[tokio::test]
async fn test_before_day_boundary_counts_as_previous_day() {
    let workspace = Workspace::new();
    workspace.write("todo.txt", "x pay rent\n");
    workspace.write("done.txt", "");
    workspace.write("state.json", r#"{"last_run":"2024-06-15T00:00:00"}"#);

    // 02:00 on the 16th is still the 15th
    let clock = ManualClock::new(noon() + chrono::TimeDelta::hours(14));
    let report = run_first_iteration(&workspace, Arc::new(clock)).await;

    assert_eq!(report.runs, 0);
    assert_eq!(workspace.read("todo.txt"), "x pay rent\n");
}

#[tokio::test]
async fn test_locked_state_file_stops_worker() {
    let workspace = Workspace::new();
    workspace.write("todo.txt", "x pay rent\n");
    workspace.write("done.txt", "");
    workspace.write("state.json", r#"{"last_run":"2024-06-01T00:00:00"}"#);

    let holder = File::open(workspace.path("state.json")).unwrap();
    fs2::FileExt::lock_exclusive(&holder).unwrap();

    let lifetime = Lifetime::new();
    let worker = workspace.worker(Arc::new(ManualClock::new(noon())), lifetime.clone());
    let report = tokio::time::timeout(Duration::from_secs(5), worker.run())
        .await
        .expect("Worker should stop on its own");

    assert!(matches!(report.stop, StopReason::Fatal(ref msg) if msg.contains("state.json")));
    assert!(lifetime.is_stopping());
    assert_eq!(workspace.read("todo.txt"), "x pay rent\n");
    assert_eq!(workspace.read("done.txt"), "");
}

#[tokio::test]
async fn test_mover_failure_is_recovered_and_day_is_marked() {
    let mut workspace = Workspace::new();
    workspace.settings.remove(DONE_TXT_PATH);
    workspace.write("todo.txt", "x pay rent\n");

    let report = run_first_iteration(&workspace, Arc::new(ManualClock::new(noon()))).await;

    assert_eq!(report.runs, 0);
    assert_eq!(report.recovered, 1);
    assert_eq!(report.stop, StopReason::Cancelled);
    assert_eq!(workspace.read("todo.txt"), "x pay rent\n");
    assert_eq!(workspace.read("state.json"), r#"{"last_run":"2024-06-15T00:00:00"}"#);
}
