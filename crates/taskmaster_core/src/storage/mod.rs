//! The storage collaborator: wherever tasks actually live.

pub mod http_store;
pub mod json_store;

use crate::config::Config;
use crate::error::AppError;
use crate::model::{Task, TaskRecord};

pub use http_store::HttpTaskStore;
pub use json_store::FileTaskStore;

pub trait TaskStore {
    /// Every stored record, unconverted, so one unreadable record does not
    /// hide the others.
    fn list(&self) -> Result<Vec<TaskRecord>, AppError>;

    /// Persists a new task. The returned copy carries the store-assigned
    /// `id` and `created_at`.
    fn create(&self, task: &Task) -> Result<Task, AppError>;

    fn update(&self, id: &str, task: &Task) -> Result<Task, AppError>;

    fn delete(&self, id: &str) -> Result<(), AppError>;

    /// Replaces the collection with server-generated sample data.
    fn seed(&self) -> Result<String, AppError> {
        Err(AppError::invalid_input("seeding requires a task server"))
    }
}

pub fn store_from_config(config: &Config) -> Result<Box<dyn TaskStore>, AppError> {
    match config.api_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => {
            tracing::debug!(url, "using task server");
            Ok(Box::new(HttpTaskStore::new(url, config.resolved_token())))
        }
        _ => {
            let path = json_store::store_path()?;
            tracing::debug!(path = %path.display(), "using local task file");
            Ok(Box::new(FileTaskStore::new(path)))
        }
    }
}
