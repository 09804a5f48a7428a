//! Task state for the active session.
//!
//! A task list is changed only through [`transition`], which takes the
//! current [`TaskState`] and a [`TaskIntent`] and returns the next state.
//! Titles are validated inside the transition, so no empty-titled task can
//! enter a list whichever front end dispatched the intent.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Task identifier: creation time in Unix milliseconds
pub type TaskId = i64;

pub const EMPTY_TITLE_MESSAGE: &str = "Task title cannot be empty";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
}

/// A validated, trimmed, non-empty task title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTitle(String);

impl TaskTitle {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation(EMPTY_TITLE_MESSAGE.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskIntent {
    /// Replace the whole list (hydration on user switch)
    Load(Vec<TaskRecord>),
    Add { title: String },
    /// Toggle the completion flag
    Complete { id: TaskId },
    Edit { id: TaskId, title: String },
    Delete { id: TaskId },
}

impl TaskIntent {
    pub fn name(&self) -> &'static str {
        match self {
            TaskIntent::Load(_) => "load",
            TaskIntent::Add { .. } => "add",
            TaskIntent::Complete { .. } => "complete",
            TaskIntent::Edit { .. } => "edit",
            TaskIntent::Delete { .. } => "delete",
        }
    }
}

/// Whether an intent found its target record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Applied,
    /// The intent named an id that is not in the list; state is unchanged
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: TaskState,
    pub effect: Effect,
    /// Id of the record the intent touched (the new id for `Add`)
    pub id: Option<TaskId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskState {
    tasks: Vec<TaskRecord>,
}

impl TaskState {
    pub fn new(tasks: Vec<TaskRecord>) -> Self {
        Self { tasks }
    }

    pub fn tasks(&self) -> &[TaskRecord] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskRecord> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Next id for a task created at `now`, never repeating one in the list
    pub fn fresh_id(&self, now: DateTime<Utc>) -> TaskId {
        let candidate = now.timestamp_millis();
        match self.tasks.iter().map(|task| task.id).max() {
            Some(max) if candidate <= max => max
                .checked_add(1)
                .unwrap_or_else(|| self.unused_id_at_or_below(candidate)),
            _ => candidate,
        }
    }

    /// Highest id `<= start` not taken in the list; the list is finite so
    /// one always exists
    fn unused_id_at_or_below(&self, start: TaskId) -> TaskId {
        let taken: HashSet<TaskId> = self.tasks.iter().map(|task| task.id).collect();
        (TaskId::MIN..=start)
            .rev()
            .find(|id| !taken.contains(id))
            .unwrap_or(start)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }
}

/// Apply `intent` to `state`, producing the next state.
///
/// Missing ids are a no-op reported as [`Effect::Missing`]. An invalid title
/// is an error and the caller keeps its current state.
pub fn transition(state: &TaskState, intent: TaskIntent, now: DateTime<Utc>) -> Result<Transition> {
    let mut next = state.clone();
    let (effect, id) = match intent {
        TaskIntent::Load(tasks) => {
            next.tasks = tasks;
            (Effect::Applied, None)
        }
        TaskIntent::Add { title } => {
            let title = TaskTitle::parse(&title)?;
            let id = state.fresh_id(now);
            next.tasks.push(TaskRecord {
                id,
                title: title.into_inner(),
                completed: false,
            });
            (Effect::Applied, Some(id))
        }
        TaskIntent::Complete { id } => match next.position(id) {
            Some(idx) => {
                let task = &mut next.tasks[idx];
                task.completed = !task.completed;
                (Effect::Applied, Some(id))
            }
            None => (Effect::Missing, Some(id)),
        },
        TaskIntent::Edit { id, title } => {
            let title = TaskTitle::parse(&title)?;
            match next.position(id) {
                Some(idx) => {
                    next.tasks[idx].title = title.into_inner();
                    (Effect::Applied, Some(id))
                }
                None => (Effect::Missing, Some(id)),
            }
        }
        TaskIntent::Delete { id } => match next.position(id) {
            Some(idx) => {
                next.tasks.remove(idx);
                (Effect::Applied, Some(id))
            }
            None => (Effect::Missing, Some(id)),
        },
    };

    Ok(Transition {
        state: next,
        effect,
        id,
    })
}
