use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::api::{ApiTransport, Method};
use crate::error::{Error, Result};
use crate::session::Session;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct SignupResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Exchange credentials for a bearer session. The caller persists it.
pub fn login(client: &dyn ApiTransport, email: &str, password: &str) -> Result<Session> {
    let value = client.request(
        Method::Post,
        "/login",
        &[],
        Some(json!({ "email": email, "password": password })),
    )?;
    let response: LoginResponse = serde_json::from_value(value)
        .map_err(|e| Error::Decode(format!("failed to parse login response: {e}")))?;

    info!(email, "logged in");
    Ok(Session {
        token: response.token,
        email: email.to_string(),
    })
}

/// Create an account. Signup does not log the user in; the returned
/// text is the server's confirmation message.
pub fn signup(client: &dyn ApiTransport, email: &str, password: &str) -> Result<String> {
    let value = client.request(
        Method::Post,
        "/signup",
        &[],
        Some(json!({ "email": email, "password": password })),
    )?;
    let response: SignupResponse = serde_json::from_value(value)
        .map_err(|e| Error::Decode(format!("failed to parse signup response: {e}")))?;

    info!(email, "signed up");
    Ok(response
        .message
        .unwrap_or_else(|| "User created successfully".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockTransport;
    use serde_json::json;

    #[test]
    fn test_login_builds_session() {
        let client = MockTransport::new(vec![Ok(json!({
            "message": "Login successful",
            "token": "tok-abc"
        }))]);
        let session = login(&client, "dev@example.com", "hunter2").unwrap();
        assert_eq!(session.token, "tok-abc");
        assert_eq!(session.email, "dev@example.com");

        let call = &client.calls()[0];
        assert_eq!(call.path, "/login");
        assert_eq!(
            call.body,
            Some(json!({ "email": "dev@example.com", "password": "hunter2" }))
        );
    }

    #[test]
    fn test_login_rejected_surfaces_server_text() {
        let client = MockTransport::new(vec![Err(Error::Server {
            status: 401,
            message: "Invalid email or password".to_string(),
        })]);
        let err = login(&client, "dev@example.com", "wrong").unwrap_err();
        assert!(err.to_string().contains("Invalid email or password"));
    }

    #[test]
    fn test_login_without_token_is_decode_error() {
        let client = MockTransport::new(vec![Ok(json!({ "message": "ok" }))]);
        let err = login(&client, "dev@example.com", "pw").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_signup_returns_message() {
        let client = MockTransport::new(vec![Ok(json!({
            "message": "User created successfully"
        }))]);
        let message = signup(&client, "new@example.com", "pw").unwrap();
        assert_eq!(message, "User created successfully");
    }

    #[test]
    fn test_signup_conflict_propagates() {
        let client = MockTransport::new(vec![Err(Error::Server {
            status: 409,
            message: "User with this email already exists".to_string(),
        })]);
        let err = signup(&client, "new@example.com", "pw").unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
