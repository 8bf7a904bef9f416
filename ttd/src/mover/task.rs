//! Task line classification

/// Prefix marking a completed task
pub const COMPLETED_MARKER: &str = "x ";

/// A single line of todo.txt, already trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task<'a> {
    /// A done task and its description without the marker
    Completed { description: &'a str },
    /// Anything else, passed through as-is
    Pending(&'a str),
}

impl<'a> Task<'a> {
    /// Classify a trimmed line
    pub fn parse(line: &'a str) -> Self {
        match line.strip_prefix(COMPLETED_MARKER) {
            Some(rest) => Task::Completed {
                description: rest.trim(),
            },
            None => Task::Pending(line),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Task::Completed { .. })
    }

    /// Format as a done.txt entry for `date`
    pub fn archive_entry(&self, date: &str) -> Option<String> {
        match self {
            Task::Completed { description } => Some(format!("{} {}", date, description)),
            Task::Pending(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_completed() {
        assert_eq!(
            Task::parse("x task 2"),
            Task::Completed {
                description: "task 2"
            }
        );
        assert_eq!(
            Task::parse("x    padded  "),
            Task::Completed {
                description: "padded"
            }
        );
    }

    #[test]
    fn test_parse_pending() {
        for line in ["task 1", "task x test", "X task", "xtask", "(A) x task", ""] {
            assert_eq!(Task::parse(line), Task::Pending(line), "{:?}", line);
        }
    }

    #[test]
    fn test_archive_entry() {
        let task = Task::parse("x call mom +family");
        assert!(task.is_completed());
        assert_eq!(
            task.archive_entry("2024-01-01").as_deref(),
            Some("2024-01-01 call mom +family")
        );

        assert_eq!(Task::parse("task 1").archive_entry("2024-01-01"), None);
    }
}
