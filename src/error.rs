use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session error: {0}")]
    Session(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("server returned status {status}")]
    Status { status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid input: {0}")]
    Input(String),
}

impl Error {
    /// The text shown to the user for a failed fetch: the server's own
    /// message when it sent one, otherwise the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Server { message, .. } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = Error::Server {
            status: 400,
            message: "bad token".to_string(),
        };
        assert_eq!(err.user_message("Could not fetch issues."), "bad token");
    }

    #[test]
    fn test_user_message_falls_back_for_bare_status() {
        let err = Error::Status { status: 502 };
        assert_eq!(
            err.user_message("Could not fetch issues."),
            "Could not fetch issues."
        );
    }

    #[test]
    fn test_user_message_falls_back_for_transport() {
        let err = Error::Transport("connection refused".to_string());
        assert_eq!(
            err.user_message("Could not fetch commits."),
            "Could not fetch commits."
        );
    }
}
