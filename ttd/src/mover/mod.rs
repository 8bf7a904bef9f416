//! Mover module for archiving completed tasks
//!
//! The Mover reads todo.txt, prepends completed tasks to done.txt dated by
//! the task list's modification time, and rewrites todo.txt with the rest.

mod core;
mod error;
mod files;
mod task;

pub use core::{MoveOutcome, Mover};
pub use error::MoverError;
pub use task::{COMPLETED_MARKER, Task};
