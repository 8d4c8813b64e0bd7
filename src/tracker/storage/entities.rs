use std::{collections::BTreeMap, fmt::Display};

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of a task. Signal is the work that moves things forward, noise is everything else
/// that still has to be done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Signal,
    Noise,
}

impl Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskType::Signal => write!(f, "signal"),
            TaskType::Noise => write!(f, "noise"),
        }
    }
}

/// The struct used for storing tasks. Serialized form matches the `tasks` and `history` values
/// of the store: `{"id","title","done","type","date"}` with the date as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntity {
    pub id: String,
    pub title: String,
    pub done: bool,
    #[serde(rename = "type")]
    pub kind: TaskType,
    pub date: NaiveDate,
}

impl TaskEntity {
    /// Creates a not yet completed task with a fresh id. Title is trimmed.
    pub fn new(title: &str, kind: TaskType, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            done: false,
            kind,
            date,
        }
    }

    pub fn with_done(self, done: bool) -> Self {
        Self { done, ..self }
    }
}

/// Archived days. Ordered by date so iteration is chronological.
pub type History = BTreeMap<NaiveDate, Vec<TaskEntity>>;

/// Partial update of a task. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub kind: Option<TaskType>,
    pub done: Option<bool>,
}

impl TaskUpdate {
    pub fn apply(&self, task: &mut TaskEntity) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(kind) = self.kind {
            task.kind = kind;
        }
        if let Some(done) = self.done {
            task.done = done;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.kind.is_none() && self.done.is_none()
    }
}
