use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// A logged-in session: the opaque bearer credential the service issued
/// and the account it belongs to. Valid until explicitly cleared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token: String,
    pub email: String,
}

/// Persists the session as TOML under a config directory
/// (`~/.config/standup` by default). Created on login, destroyed on
/// logout; every API client is constructed from whatever this holds.
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default store directory: `$HOME/.config/standup`.
    pub fn default_dir() -> PathBuf {
        match std::env::var_os("HOME") {
            Some(home) => Path::new(&home).join(".config").join("standup"),
            None => PathBuf::from(".standup"),
        }
    }

    fn session_file(&self) -> PathBuf {
        self.dir.join("session.toml")
    }

    /// Load the persisted session. A missing, unreadable, or corrupted
    /// file means "not logged in", never a hard failure.
    pub fn load(&self) -> Option<Session> {
        let path = self.session_file();
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<Session>(&content) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!("corrupted session file {}: {e}", path.display());
                    None
                }
            },
            Err(e) => {
                warn!("failed to read session file {}: {e}", path.display());
                None
            }
        }
    }

    /// Persist a freshly issued session.
    pub fn save(&self, session: &Session) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| Error::Session(format!("failed to create session dir: {e}")))?;

        let content = toml::to_string_pretty(session)
            .map_err(|e| Error::Session(format!("failed to serialize session: {e}")))?;

        std::fs::write(self.session_file(), content)
            .map_err(|e| Error::Session(format!("failed to write session file: {e}")))?;

        Ok(())
    }

    /// Invalidate the session. Clearing an absent session is a no-op.
    pub fn clear(&self) -> Result<()> {
        let path = self.session_file();
        if path.exists() {
            std::fs::remove_file(&path)
                .map_err(|e| Error::Session(format!("failed to remove session file: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SessionStore) {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path().join("standup"));
        (dir, store)
    }

    fn test_session() -> Session {
        Session {
            token: "tok-123".to_string(),
            email: "dev@example.com".to_string(),
        }
    }

    #[test]
    fn test_load_missing_returns_none() {
        let (_dir, store) = test_store();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (_dir, store) = test_store();
        store.save(&test_session()).unwrap();
        assert_eq!(store.load().unwrap(), test_session());
    }

    #[test]
    fn test_corrupted_session_returns_none() {
        let (_dir, store) = test_store();
        std::fs::create_dir_all(&store.dir).unwrap();
        std::fs::write(store.session_file(), "not valid toml [[[").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_clear_removes_session() {
        let (_dir, store) = test_store();
        store.save(&test_session()).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_clear_without_session_is_noop() {
        let (_dir, store) = test_store();
        store.clear().unwrap();
    }

    #[test]
    fn test_session_survives_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("standup");

        {
            let store = SessionStore::new(&path);
            store.save(&test_session()).unwrap();
        }

        {
            let store = SessionStore::new(&path);
            assert_eq!(store.load().unwrap().token, "tok-123");
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_default_dir_under_home() {
        let tmp = TempDir::new().unwrap();
        // SAFETY: serialized with other env-mutating tests.
        unsafe { std::env::set_var("HOME", tmp.path()) };
        let dir = SessionStore::default_dir();
        assert_eq!(dir, tmp.path().join(".config").join("standup"));
    }
}
