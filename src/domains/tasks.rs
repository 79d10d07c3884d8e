use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::api::{ApiTransport, Method};
use crate::error::{Error, Result};
use crate::filters::TaskFilter;

/// A to-do item. Owned by the service; the local collection is a cached
/// read replica keyed by `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Fetch the task list under the given filter. The response body is the
/// new collection, wholesale.
pub fn fetch(client: &dyn ApiTransport, filter: &TaskFilter) -> Result<Vec<Task>> {
    let value = client.request(Method::Get, "/tasks", &filter.query(), None)?;
    let tasks: Vec<Task> = serde_json::from_value(value)
        .map_err(|e| Error::Decode(format!("failed to parse tasks: {e}")))?;
    debug!(count = tasks.len(), "fetched tasks");
    Ok(tasks)
}

/// Create a task. The server assigns identity and creation date, so the
/// caller must re-fetch rather than insert the result locally.
pub fn create(client: &dyn ApiTransport, text: &str) -> Result<Task> {
    let value = client.request(Method::Post, "/tasks", &[], Some(json!({ "text": text })))?;
    let task: Task = serde_json::from_value(value)
        .map_err(|e| Error::Decode(format!("failed to parse created task: {e}")))?;
    debug!(id = %task.id, "created task");
    Ok(task)
}

pub fn delete(client: &dyn ApiTransport, id: &str) -> Result<()> {
    client.request(Method::Delete, &format!("/tasks/{id}"), &[], None)?;
    debug!(id, "deleted task");
    Ok(())
}

pub fn toggle_complete(client: &dyn ApiTransport, id: &str) -> Result<()> {
    client.request(Method::Put, &format!("/tasks/{id}/complete"), &[], None)?;
    debug!(id, "toggled task completion");
    Ok(())
}
