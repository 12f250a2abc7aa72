use crate::error::AppError;
use crate::model::{Task, TaskRecord};
use crate::storage::TaskStore;
use serde::Deserialize;
use std::time::Duration;

/// Client for the task REST backend (`/todos`, `/seed`).
///
/// The session token is issued elsewhere; this client only forwards it as a
/// bearer credential.
pub struct HttpTaskStore {
    base_url: String,
    token: Option<String>,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

impl HttpTaskStore {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            token: token.filter(|value| !value.trim().is_empty()),
            agent: http_agent(),
        }
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo_url(&self, id: &str) -> String {
        format!("{}/todos/{}", self.base_url, urlencoding::encode(id))
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let request = self.agent.request(method, url);
        match self.token.as_deref() {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn send(&self, method: &str, url: &str, body: Option<&TaskRecord>) -> Result<String, AppError> {
        tracing::debug!(method, url, "task server request");
        let request = self.request(method, url);
        let result = match body {
            Some(record) => {
                let payload = serde_json::to_string(record)
                    .map_err(|err| AppError::invalid_data(err.to_string()))?;
                request
                    .set("Content-Type", "application/json")
                    .send_string(&payload)
            }
            None => request.call(),
        };

        result
            .map_err(map_http_error)?
            .into_string()
            .map_err(|err| AppError::io(err.to_string()))
    }
}

impl TaskStore for HttpTaskStore {
    fn list(&self) -> Result<Vec<TaskRecord>, AppError> {
        let body = self.send("GET", &self.todos_url(), None)?;
        parse_json(&body)
    }

    fn create(&self, task: &Task) -> Result<Task, AppError> {
        let record = task.to_record()?;
        let body = self.send("POST", &self.todos_url(), Some(&record))?;
        Task::try_from(parse_json::<TaskRecord>(&body)?)
    }

    fn update(&self, id: &str, task: &Task) -> Result<Task, AppError> {
        let record = task.to_record()?;
        let body = self.send("PUT", &self.todo_url(id), Some(&record))?;
        Task::try_from(parse_json::<TaskRecord>(&body)?)
    }

    fn delete(&self, id: &str) -> Result<(), AppError> {
        self.send("DELETE", &self.todo_url(id), None)?;
        Ok(())
    }

    fn seed(&self) -> Result<String, AppError> {
        let url = format!("{}/seed", self.base_url);
        let body = self.send("POST", &url, None)?;
        Ok(parse_json::<MessageBody>(&body)?.message)
    }
}

fn http_agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(Duration::from_secs(10))
        .timeout_read(Duration::from_secs(20))
        .timeout_write(Duration::from_secs(20))
        .build()
}

fn parse_json<T: for<'de> Deserialize<'de>>(body: &str) -> Result<T, AppError> {
    serde_json::from_str(body).map_err(|err| AppError::invalid_data(err.to_string()))
}

fn map_http_error(err: ureq::Error) -> AppError {
    match err {
        ureq::Error::Status(404, _) => AppError::invalid_input("task not found"),
        ureq::Error::Status(code, response) => AppError::io(format!(
            "task server returned {code} {}",
            response.status_text()
        )),
        ureq::Error::Transport(transport) => AppError::io(transport.to_string()),
    }
}
