//! Line-oriented file access with advisory locking

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use fs2::FileExt;
use tracing::debug;

use super::error::MoverError;

/// Read every line of `path` under a shared lock
pub(crate) fn read_lines(path: &Path) -> Result<Vec<String>, MoverError> {
    debug!(?path, "read_lines: called");
    let read_err = |source| MoverError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(read_err)?;
    FileExt::try_lock_shared(&file).map_err(|source| MoverError::Locked {
        path: path.to_path_buf(),
        source,
    })?;

    let mut content = String::new();
    file.read_to_string(&mut content).map_err(read_err)?;

    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    debug!(?path, count = lines.len(), "read_lines: done");
    Ok(lines)
}

/// Last modification time of `path` in local time
pub(crate) fn last_modified(path: &Path) -> Result<NaiveDateTime, MoverError> {
    let modified = path
        .metadata()
        .and_then(|meta| meta.modified())
        .map_err(|source| MoverError::Modified {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(DateTime::<Local>::from(modified).naive_local())
}

/// An exclusively locked file awaiting new content
///
/// The lock is held until the value is dropped.
pub(crate) struct WriteLock {
    path: PathBuf,
    file: File,
}

impl WriteLock {
    /// Open an existing file for writing and lock it
    ///
    /// The file is not truncated until [`WriteLock::replace_lines`].
    pub(crate) fn acquire(path: &Path) -> Result<Self, MoverError> {
        debug!(?path, "WriteLock::acquire: called");
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|source| MoverError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        FileExt::try_lock_exclusive(&file).map_err(|source| MoverError::Locked {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    /// Replace the file content with `lines`, each ending in a newline
    pub(crate) fn replace_lines<I, L>(&mut self, lines: I) -> Result<(), MoverError>
    where
        I: IntoIterator<Item = L>,
        L: AsRef<str>,
    {
        let mut content = String::new();
        for line in lines {
            content.push_str(line.as_ref());
            content.push('\n');
        }

        let write_err = |source| MoverError::Write {
            path: self.path.clone(),
            source,
        };

        self.file.set_len(0).map_err(write_err)?;
        self.file.write_all(content.as_bytes()).map_err(write_err)?;
        self.file.flush().map_err(write_err)?;
        debug!(path = ?self.path, bytes = content.len(), "WriteLock::replace_lines: written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_lines_handles_crlf() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("todo.txt");
        fs::write(&path, "a\r\nb\nc").unwrap();

        assert_eq!(read_lines(&path).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_read_lines_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("todo.txt");

        let err = read_lines(&path).unwrap_err();
        assert!(matches!(err, MoverError::Read { .. }));
        assert!(err.to_string().contains("todo.txt"));
    }

    #[test]
    fn test_replace_lines_truncates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("done.txt");
        fs::write(&path, "a much longer line than what follows\n").unwrap();

        let mut lock = WriteLock::acquire(&path).unwrap();
        lock.replace_lines(["one", "two"]).unwrap();
        drop(lock);

        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn test_acquire_fails_while_locked() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("done.txt");
        fs::write(&path, "").unwrap();

        let first = WriteLock::acquire(&path).unwrap();
        let err = WriteLock::acquire(&path).err().unwrap();
        assert!(matches!(err, MoverError::Locked { .. }));

        drop(first);
        assert!(WriteLock::acquire(&path).is_ok());
    }

    #[test]
    fn test_acquire_does_not_create_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.txt");

        assert!(WriteLock::acquire(&path).is_err());
        assert!(!path.exists());
    }
}
