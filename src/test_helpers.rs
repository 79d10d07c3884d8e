use std::cell::RefCell;

use serde_json::{Value, json};

use crate::api::{ApiTransport, Method};
use crate::error::{Error, Result};

/// One request as seen by a `MockTransport`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RecordedCall {
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Scripted transport: hands out canned responses in FIFO order and
/// records every request for assertions.
pub struct MockTransport {
    responses: RefCell<Vec<Result<Value>>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new(responses: Vec<Result<Value>>) -> Self {
        Self {
            responses: RefCell::new(responses),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl ApiTransport for MockTransport {
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value> {
        self.calls.borrow_mut().push(RecordedCall {
            method,
            path: path.to_string(),
            query: query.to_vec(),
            body,
        });
        let mut responses = self.responses.borrow_mut();
        if responses.is_empty() {
            Err(Error::Transport("no more mock responses".to_string()))
        } else {
            responses.remove(0)
        }
    }
}

/// JSON for one task as the service returns it.
pub fn task_json(id: &str, text: &str, completed: bool) -> Value {
    json!({
        "id": id,
        "text": text,
        "completed": completed,
        "date": "2024-03-01T09:00:00Z"
    })
}

/// JSON for one Jira issue with the nested `fields` envelope.
pub fn issue_json(key: &str, summary: &str, status: &str) -> Value {
    json!({
        "id": format!("1{}", key.len()),
        "key": key,
        "fields": {
            "summary": summary,
            "status": { "name": status },
            "issuetype": { "name": "Task" }
        }
    })
}

/// JSON for one Bitbucket commit.
pub fn commit_json(hash: &str, message: &str, author: &str) -> Value {
    json!({
        "hash": hash,
        "message": message,
        "date": "2024-03-02T10:15:00Z",
        "author": { "user": { "display_name": author, "uuid": "u-1" } }
    })
}
