use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::session::Session;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Abstraction over the dashboard service HTTP API for testability.
///
/// One request, one attempt: no retry and no token refresh. An
/// unauthorized response surfaces to the caller like any other server
/// error.
pub trait ApiTransport {
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value>;
}

/// Real transport bound to a fixed service origin and, when logged in,
/// a bearer credential attached to every request.
pub struct HttpTransport {
    base_url: String,
    token: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, session: Option<&Session>) -> Self {
        Self {
            base_url: base_url.into(),
            token: session.map(|s| s.token.clone()),
        }
    }
}

impl ApiTransport for HttpTransport {
    fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let mut request = ureq::request(method.as_str(), &url);
        for (name, value) in query {
            request = request.query(name, value);
        }
        if let Some(ref token) = self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }

        debug!(method = method.as_str(), path, "issuing request");

        let response = match body {
            Some(json) => request.send_json(json),
            None => request.call(),
        };

        match response {
            Ok(resp) => parse_body(resp),
            Err(ureq::Error::Status(status, resp)) => {
                let body: Option<Value> = resp.into_json().ok();
                Err(server_error(status, body.as_ref()))
            }
            Err(err @ ureq::Error::Transport(_)) => Err(Error::Transport(err.to_string())),
        }
    }
}

fn parse_body(resp: ureq::Response) -> Result<Value> {
    let text = resp
        .into_string()
        .map_err(|e| Error::Decode(format!("failed to read response body: {e}")))?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| Error::Decode(format!("invalid JSON response: {e}")))
}

/// Mine an error response body for its most specific text: a structured
/// `details` field, then a structured `error` field, then nothing.
pub fn server_error(status: u16, body: Option<&Value>) -> Error {
    let message = body.and_then(|b| {
        b.get("details")
            .and_then(Value::as_str)
            .or_else(|| b.get("error").and_then(Value::as_str))
            .map(str::to_string)
    });
    match message {
        Some(message) => Error::Server { status, message },
        None => Error::Status { status },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_server_error_prefers_details() {
        let body = json!({"error": "Failed to fetch Jira issues: 401", "details": "token expired"});
        let err = server_error(401, Some(&body));
        match err {
            Error::Server { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "token expired");
            }
            other => panic!("expected Server error, got {other:?}"),
        }
    }

    #[test]
    fn test_server_error_falls_back_to_error_field() {
        let body = json!({"error": "bad token"});
        let err = server_error(401, Some(&body));
        match err {
            Error::Server { message, .. } => assert_eq!(message, "bad token"),
            other => panic!("expected Server error, got {other:?}"),
        }
    }

    #[test]
    fn test_server_error_without_structured_body() {
        let err = server_error(502, None);
        assert!(matches!(err, Error::Status { status: 502 }));

        let body = json!("upstream exploded");
        let err = server_error(502, Some(&body));
        assert!(matches!(err, Error::Status { status: 502 }));
    }

    #[test]
    fn test_server_error_ignores_non_string_fields() {
        let body = json!({"error": {"nested": true}});
        let err = server_error(500, Some(&body));
        assert!(matches!(err, Error::Status { status: 500 }));
    }

    #[test]
    fn test_method_strings() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }
}
