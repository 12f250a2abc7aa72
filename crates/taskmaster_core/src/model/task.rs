use crate::error::AppError;
use crate::timestamp::{format_timestamp, local_offset, parse_optional};
use serde::{Deserialize, Serialize};
use std::fmt;
use time::{OffsetDateTime, UtcOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        }
    }

    pub fn from_label(raw: &str) -> Option<Self> {
        match raw.trim() {
            "pending" => Some(Self::Pending),
            "in-progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task as the rest of the crate sees it.
///
/// The backend also carries a `completed` boolean; here it is derived from
/// `status` and only materialized in [`TaskRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: Option<String>,
    pub title: String,
    pub status: TaskStatus,
    pub created_at: Option<OffsetDateTime>,
    pub start_date: Option<OffsetDateTime>,
    pub due_date: Option<OffsetDateTime>,
}

impl Task {
    pub fn new<T: Into<String>>(title: T) -> Self {
        Self {
            id: None,
            title: title.into(),
            status: TaskStatus::Pending,
            created_at: None,
            start_date: None,
            due_date: None,
        }
    }

    pub fn completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        match self.due_date {
            Some(due) => !self.completed() && due < now,
            None => false,
        }
    }

    pub fn to_record(&self) -> Result<TaskRecord, AppError> {
        Ok(TaskRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            completed: self.completed(),
            status: self.status.as_str().to_string(),
            created_at: self.created_at.map(format_timestamp).transpose()?,
            due_date: self.due_date.map(format_timestamp).transpose()?,
            start_date: self.start_date.map(format_timestamp).transpose()?,
        })
    }
}

/// Task JSON as exchanged with the storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
}

fn default_status() -> String {
    TaskStatus::Pending.as_str().to_string()
}

impl TaskRecord {
    pub fn parsed_status(&self) -> Result<TaskStatus, AppError> {
        TaskStatus::from_label(&self.status)
            .ok_or_else(|| AppError::unknown_status(format!("unknown status '{}'", self.status)))
    }

    /// Converts to a [`Task`], reading offset-less timestamps in `naive_offset`.
    ///
    /// `status` wins over a disagreeing `completed` flag.
    pub fn into_task(self, naive_offset: UtcOffset) -> Result<Task, AppError> {
        let status = self.parsed_status()?;
        Ok(Task {
            id: self.id,
            title: self.title,
            status,
            created_at: parse_optional(self.created_at.as_deref(), naive_offset)?,
            start_date: parse_optional(self.start_date.as_deref(), naive_offset)?,
            due_date: parse_optional(self.due_date.as_deref(), naive_offset)?,
        })
    }
}

// Backend timestamps without an offset are the writer's local time.
impl TryFrom<TaskRecord> for Task {
    type Error = AppError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        record.into_task(local_offset())
    }
}
