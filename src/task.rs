//! Task records and status-partitioned board state.
//!
//! Tasks are read-only in this client: they are fetched through a
//! [`crate::client::Gateway`] and partitioned for display. Mutations happen
//! elsewhere.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Task status as exposed by the backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    pub fn wire_name(self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A task as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub comment_count: u32,
}

impl TaskRecord {
    pub fn is_assigned(&self) -> bool {
        self.assignee_email
            .as_deref()
            .map(|email| !email.trim().is_empty())
            .unwrap_or(false)
    }

    /// A task is overdue when its due date has passed and it is not done.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match self.due_date {
            Some(due) => due < now && self.status != TaskStatus::Done,
            None => false,
        }
    }
}

/// How the task set is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Board,
    List,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Board => ViewMode::List,
            ViewMode::List => ViewMode::Board,
        }
    }
}

/// Tasks partitioned into the three status buckets.
#[derive(Debug, Clone, Default)]
pub struct Board {
    pub todo: Vec<TaskRecord>,
    pub in_progress: Vec<TaskRecord>,
    pub done: Vec<TaskRecord>,
}

impl Board {
    /// Partition `tasks` by status. Each task lands in exactly one bucket
    /// and the server-provided order is preserved within each.
    pub fn partition(tasks: Vec<TaskRecord>) -> Self {
        let mut board = Board::default();
        for task in tasks {
            match task.status {
                TaskStatus::Todo => board.todo.push(task),
                TaskStatus::InProgress => board.in_progress.push(task),
                TaskStatus::Done => board.done.push(task),
            }
        }
        board
    }

    pub fn bucket(&self, status: TaskStatus) -> &[TaskRecord] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::Done => &self.done,
        }
    }

    pub fn total(&self) -> usize {
        self.todo.len() + self.in_progress.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
