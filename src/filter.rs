//! View filtering over a task list.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::task::TaskRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 3] = [TaskFilter::All, TaskFilter::Completed, TaskFilter::Incomplete];

    pub fn matches(self, task: &TaskRecord) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Completed => task.completed,
            TaskFilter::Incomplete => !task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Completed => "completed",
            TaskFilter::Incomplete => "incomplete",
        }
    }

    /// Label shown in the selector
    pub fn label(self) -> &'static str {
        match self {
            TaskFilter::All => "All Tasks",
            TaskFilter::Completed => "Completed Tasks",
            TaskFilter::Incomplete => "Incomplete Tasks",
        }
    }

    /// Next mode in selector order, wrapping around
    pub fn cycle(self) -> Self {
        match self {
            TaskFilter::All => TaskFilter::Completed,
            TaskFilter::Completed => TaskFilter::Incomplete,
            TaskFilter::Incomplete => TaskFilter::All,
        }
    }
}

impl std::fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskFilter {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "completed" => Ok(TaskFilter::Completed),
            "incomplete" => Ok(TaskFilter::Incomplete),
            _ => Err(Error::InvalidArgument(format!(
                "invalid filter '{}': must be all, completed, or incomplete",
                s
            ))),
        }
    }
}

/// Tasks matching `filter`, in list order
pub fn filter_tasks(tasks: &[TaskRecord], filter: TaskFilter) -> Vec<&TaskRecord> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TaskRecord> {
        [(1, true), (2, false), (3, true)]
            .into_iter()
            .map(|(id, completed)| TaskRecord {
                id,
                title: format!("task {id}"),
                completed,
            })
            .collect()
    }

    fn ids(tasks: Vec<&TaskRecord>) -> Vec<i64> {
        tasks.into_iter().map(|task| task.id).collect()
    }

    #[test]
    fn completed_keeps_order() {
        assert_eq!(ids(filter_tasks(&sample(), TaskFilter::Completed)), vec![1, 3]);
    }

    #[test]
    fn incomplete_returns_the_rest() {
        assert_eq!(ids(filter_tasks(&sample(), TaskFilter::Incomplete)), vec![2]);
    }

    #[test]
    fn all_returns_everything_unchanged() {
        assert_eq!(ids(filter_tasks(&sample(), TaskFilter::All)), vec![1, 2, 3]);
    }

    #[test]
    fn parse_accepts_known_modes() {
        assert_eq!("all".parse::<TaskFilter>().unwrap(), TaskFilter::All);
        assert_eq!("Completed".parse::<TaskFilter>().unwrap(), TaskFilter::Completed);
        assert_eq!(" incomplete ".parse::<TaskFilter>().unwrap(), TaskFilter::Incomplete);
        assert!("done".parse::<TaskFilter>().is_err());
    }

    #[test]
    fn cycle_visits_every_mode() {
        let mut filter = TaskFilter::All;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(filter);
            filter = filter.cycle();
        }
        assert_eq!(seen, TaskFilter::ALL.to_vec());
        assert_eq!(filter, TaskFilter::All);
    }
}
