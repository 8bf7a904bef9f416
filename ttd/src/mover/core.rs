//! Mover implementation

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use super::error::MoverError;
use super::files::{WriteLock, last_modified, read_lines};
use super::task::Task;
use crate::clock::Clock;
use crate::config::{DONE_TXT_PATH, Settings, TODO_TXT_PATH};

/// Result of a single move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No completed tasks; neither file was touched
    NothingToMove,
    /// `count` tasks were archived under `date`
    Moved { count: usize, date: NaiveDate },
}

/// The Mover archives completed tasks from todo.txt into done.txt
pub struct Mover<S: Settings> {
    settings: S,
    clock: Arc<dyn Clock>,
}

impl<S: Settings> Mover<S> {
    /// Create a new Mover
    pub fn new(settings: S, clock: Arc<dyn Clock>) -> Self {
        Self { settings, clock }
    }

    /// Move every completed task from todo.txt to the top of done.txt
    ///
    /// Both files are locked before either is written. If writing done.txt
    /// succeeds but rewriting todo.txt then fails, done.txt keeps the new
    /// entries and the tasks are archived again by the next successful run.
    pub fn run(&self) -> Result<MoveOutcome, MoverError> {
        let todo_path = self.required_path(TODO_TXT_PATH)?;
        let done_path = self.required_path(DONE_TXT_PATH)?;
        debug!(?todo_path, ?done_path, "Mover::run: called");

        let lines: Vec<String> = read_lines(&todo_path)?
            .into_iter()
            .map(|line| line.trim().to_string())
            .collect();
        let tasks: Vec<Task<'_>> = lines.iter().map(|line| Task::parse(line)).collect();

        let count = tasks.iter().filter(|t| t.is_completed()).count();
        if count == 0 {
            info!("No tasks to move");
            return Ok(MoveOutcome::NothingToMove);
        }

        let date = self.clock.adjust(last_modified(&todo_path)?);
        let stamp = date.format("%Y-%m-%d").to_string();
        debug!(count, %stamp, "Mover::run: archiving");

        let mut archive: Vec<String> = tasks.iter().filter_map(|t| t.archive_entry(&stamp)).collect();
        archive.extend(read_lines(&done_path)?);

        let pending = tasks.iter().filter_map(|t| match t {
            Task::Pending(line) => Some(*line),
            Task::Completed { .. } => None,
        });

        let mut done_lock = WriteLock::acquire(&done_path)?;
        let mut todo_lock = WriteLock::acquire(&todo_path)?;
        done_lock.replace_lines(&archive)?;
        todo_lock.replace_lines(pending)?;

        info!(task_count = count, "Moved {} task(s)", count);
        Ok(MoveOutcome::Moved { count, date })
    }

    fn required_path(&self, key: &str) -> Result<PathBuf, MoverError> {
        match self.settings.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(PathBuf::from(value)),
            _ => Err(MoverError::Configuration { key: key.to_string() }),
        }
    }
}
