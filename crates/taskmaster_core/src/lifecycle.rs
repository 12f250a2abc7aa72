//! Status transitions for a single task.
//!
//! Two strategies exist. [`TransitionStrategy::Cycle`] walks
//! `pending -> in-progress -> completed -> pending`; [`TransitionStrategy::Toggle`]
//! flips between open and `completed` the way the first version of the board did.

use crate::error::AppError;
use crate::model::TaskStatus;
use std::fmt;
use std::str::FromStr;

/// Next status under the three-state cycle.
pub fn advance(current: TaskStatus) -> TaskStatus {
    match current {
        TaskStatus::Pending => TaskStatus::InProgress,
        TaskStatus::InProgress => TaskStatus::Completed,
        TaskStatus::Completed => TaskStatus::Pending,
    }
}

/// [`advance`] over the external string form of a status.
pub fn advance_raw(current: &str) -> Result<TaskStatus, AppError> {
    TaskStatus::from_label(current)
        .map(advance)
        .ok_or_else(|| AppError::invalid_state(format!("cannot advance from '{current}'")))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransitionStrategy {
    #[default]
    Cycle,
    Toggle,
}

impl TransitionStrategy {
    pub fn next(self, current: TaskStatus) -> TaskStatus {
        match self {
            Self::Cycle => advance(current),
            Self::Toggle => match current {
                TaskStatus::Completed => TaskStatus::Pending,
                TaskStatus::Pending | TaskStatus::InProgress => TaskStatus::Completed,
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cycle => "cycle",
            Self::Toggle => "toggle",
        }
    }
}

impl fmt::Display for TransitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransitionStrategy {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cycle" => Ok(Self::Cycle),
            "toggle" => Ok(Self::Toggle),
            other => Err(AppError::invalid_input(format!(
                "unknown transition strategy '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Advance(TransitionStrategy),
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Status { next: TaskStatus, completed: bool },
    Remove,
}

pub fn apply(current: TaskStatus, trigger: Trigger) -> Transition {
    match trigger {
        Trigger::Advance(strategy) => {
            let next = strategy.next(current);
            Transition::Status {
                next,
                completed: next == TaskStatus::Completed,
            }
        }
        Trigger::Delete => Transition::Remove,
    }
}
