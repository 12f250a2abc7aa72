use crate::error::AppError;
use crate::lifecycle::{self, Transition, TransitionStrategy, Trigger};
use crate::model::{Task, TaskRecord};
use crate::notify::{Notifier, activation_argument};
use crate::report::{self, Report};
use crate::storage::TaskStore;
use crate::timestamp::local_offset;
use time::OffsetDateTime;

#[derive(Debug)]
pub struct NotificationOutcome {
    pub tasks: Vec<Task>,
    pub failures: Vec<NotificationFailure>,
}

#[derive(Debug)]
pub struct NotificationFailure {
    pub task_id: String,
    pub error: AppError,
}

/// A stored record that could not be converted into a [`Task`].
#[derive(Debug, Clone)]
pub struct UnreadableTask {
    pub record: TaskRecord,
    pub error: AppError,
}

/// In-memory task collection kept in step with a [`TaskStore`].
///
/// Every mutation goes to the store first; the collection only changes once
/// the store has confirmed the write. Records that fail to convert are kept
/// aside: they can still be deleted, but `show`, `advance` and `report` fail
/// with their conversion error.
pub struct TaskBoard {
    store: Box<dyn TaskStore>,
    tasks: Vec<Task>,
    unreadable: Vec<UnreadableTask>,
}

impl TaskBoard {
    pub fn load(store: Box<dyn TaskStore>) -> Result<Self, AppError> {
        let mut board = Self {
            store,
            tasks: Vec::new(),
            unreadable: Vec::new(),
        };
        board.reload()?;
        Ok(board)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn unreadable(&self) -> &[UnreadableTask] {
        &self.unreadable
    }

    pub fn get(&self, id: &str) -> Result<&Task, AppError> {
        let index = self.position(id)?;
        Ok(&self.tasks[index])
    }

    pub fn add(
        &mut self,
        title: &str,
        start_date: Option<OffsetDateTime>,
        due_date: Option<OffsetDateTime>,
    ) -> Result<Task, AppError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("title is required"));
        }

        let mut task = Task::new(trimmed);
        task.start_date = start_date;
        task.due_date = due_date;

        let created = self.store.create(&task)?;
        tracing::info!(id = ?created.id, title = %created.title, "task created");
        self.tasks.push(created.clone());
        Ok(created)
    }

    pub fn advance(&mut self, id: &str, strategy: TransitionStrategy) -> Result<Task, AppError> {
        let index = self.position(id)?;
        let current = &self.tasks[index];

        let next = match lifecycle::apply(current.status, Trigger::Advance(strategy)) {
            Transition::Status { next, .. } => next,
            Transition::Remove => {
                return Err(AppError::invalid_state("advance produced a removal"));
            }
        };
        tracing::debug!(id, from = %current.status, to = %next, %strategy, "advancing task");

        let mut updated = current.clone();
        updated.status = next;
        let confirmed = self.store.update(id.trim(), &updated)?;
        tracing::info!(id, status = %confirmed.status, "task updated");

        self.tasks[index] = confirmed.clone();
        Ok(confirmed)
    }

    /// Removes a task through the store and returns its last stored form.
    ///
    /// Unreadable records can be deleted too, since deletion does not depend
    /// on their status.
    pub fn delete(&mut self, id: &str) -> Result<TaskRecord, AppError> {
        let trimmed_id = required_id(id)?;
        if let Some(index) = self
            .unreadable
            .iter()
            .position(|entry| entry.record.id.as_deref() == Some(trimmed_id))
        {
            self.store.delete(trimmed_id)?;
            tracing::info!(id = trimmed_id, "unreadable task deleted");
            return Ok(self.unreadable.remove(index).record);
        }

        let index = self.position(id)?;
        match lifecycle::apply(self.tasks[index].status, Trigger::Delete) {
            Transition::Remove => self.store.delete(trimmed_id)?,
            Transition::Status { .. } => {
                return Err(AppError::invalid_state("delete produced a status change"));
            }
        }
        tracing::info!(id = trimmed_id, "task deleted");

        self.tasks.remove(index).to_record()
    }

    /// Asks the store to regenerate sample data, then reloads the collection.
    pub fn seed(&mut self) -> Result<String, AppError> {
        let message = self.store.seed()?;
        self.reload()?;
        Ok(message)
    }

    pub fn overdue(&self, now: OffsetDateTime) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|task| task.is_overdue(now))
            .cloned()
            .collect()
    }

    /// Fails with the first unreadable record's error, so totals never
    /// silently leave tasks out.
    pub fn report(&self, reference: OffsetDateTime, window_size: usize) -> Result<Report, AppError> {
        if let Some(entry) = self.unreadable.first() {
            return Err(entry.error.clone());
        }
        report::summarize(&self.tasks, reference, window_size)
    }

    fn reload(&mut self) -> Result<(), AppError> {
        let records = self.store.list()?;
        let naive_offset = local_offset();

        self.tasks.clear();
        self.unreadable.clear();
        for record in records {
            match record.clone().into_task(naive_offset) {
                Ok(task) => self.tasks.push(task),
                Err(error) => {
                    tracing::warn!(id = ?record.id, error = %error, "skipping unreadable task");
                    self.unreadable.push(UnreadableTask { record, error });
                }
            }
        }

        tracing::debug!(
            count = self.tasks.len(),
            unreadable = self.unreadable.len(),
            "loaded tasks"
        );
        Ok(())
    }

    fn position(&self, id: &str) -> Result<usize, AppError> {
        let trimmed_id = required_id(id)?;

        if let Some(index) = self
            .tasks
            .iter()
            .position(|task| task.id.as_deref() == Some(trimmed_id))
        {
            return Ok(index);
        }

        match self
            .unreadable
            .iter()
            .find(|entry| entry.record.id.as_deref() == Some(trimmed_id))
        {
            Some(entry) => Err(entry.error.clone()),
            None => Err(AppError::invalid_input("task not found")),
        }
    }
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed_id = id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(trimmed_id)
}

pub fn notify_overdue(
    board: &TaskBoard,
    notifier: &dyn Notifier,
    now: OffsetDateTime,
) -> NotificationOutcome {
    let mut notified = Vec::new();
    let mut failures = Vec::new();

    for task in board.tasks() {
        if !task.is_overdue(now) {
            continue;
        }

        let task_id = task.id.clone().unwrap_or_default();
        let action = activation_argument(&task_id);
        match notifier.notify_with_action(task, &action) {
            Ok(()) => notified.push(task.clone()),
            Err(err) => {
                tracing::warn!(id = %task_id, error = %err, "notification failed");
                failures.push(NotificationFailure {
                    task_id,
                    error: err,
                });
            }
        }
    }

    NotificationOutcome {
        tasks: notified,
        failures,
    }
}
