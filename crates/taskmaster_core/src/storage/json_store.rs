use crate::error::AppError;
use crate::model::{Task, TaskRecord};
use crate::storage::TaskStore;
use crate::timestamp::format_timestamp;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

pub const SCHEMA_VERSION: u32 = 1;
const STORE_FILE_NAME: &str = "tasks.json";
const STORE_ENV_VAR: &str = "TASKMASTER_STORE_PATH";

#[derive(Debug, Serialize, Deserialize)]
struct StoredTasks {
    schema_version: u32,
    tasks: Vec<TaskRecord>,
}

pub fn store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("taskmaster")
            .join(STORE_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("taskmaster")
            .join(STORE_FILE_NAME))
    }
}

/// Single-user task file, used when no task server is configured.
#[derive(Debug, Clone)]
pub struct FileTaskStore {
    path: PathBuf,
}

impl FileTaskStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl TaskStore for FileTaskStore {
    fn list(&self) -> Result<Vec<TaskRecord>, AppError> {
        load_records(&self.path)
    }

    fn create(&self, task: &Task) -> Result<Task, AppError> {
        let now = OffsetDateTime::now_utc();
        let mut record = task.to_record()?;
        record.id = Some(format!("task-{}", now.unix_timestamp_nanos()));
        record.created_at = Some(format_timestamp(now)?);

        let mut records = load_records(&self.path)?;
        records.push(record.clone());
        save_records(&self.path, &records)?;

        Task::try_from(record)
    }

    fn update(&self, id: &str, task: &Task) -> Result<Task, AppError> {
        let mut records = load_records(&self.path)?;
        let stored = records
            .iter_mut()
            .find(|record| record.id.as_deref() == Some(id))
            .ok_or_else(|| AppError::invalid_input("task not found"))?;

        let mut replacement = task.to_record()?;
        replacement.id = Some(id.to_string());
        replacement.created_at = stored.created_at.take();
        *stored = replacement.clone();
        save_records(&self.path, &records)?;

        Task::try_from(replacement)
    }

    fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut records = load_records(&self.path)?;
        let index = records
            .iter()
            .position(|record| record.id.as_deref() == Some(id))
            .ok_or_else(|| AppError::invalid_input("task not found"))?;

        records.remove(index);
        save_records(&self.path, &records)
    }
}

fn load_records(path: &Path) -> Result<Vec<TaskRecord>, AppError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path).map_err(|err| AppError::io(err.to_string()))?;
    let stored: StoredTasks =
        serde_json::from_str(&content).map_err(|err| AppError::invalid_data(err.to_string()))?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data("schema_version mismatch"));
    }

    Ok(stored.tasks)
}

fn save_records(path: &Path, records: &[TaskRecord]) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredTasks {
        schema_version: SCHEMA_VERSION,
        tasks: records.to_vec(),
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    Ok(())
}
