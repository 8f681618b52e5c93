#![forbid(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::error::TaskuiError;

/// Authentication state persisted across invocations: the opaque token the
/// server handed out at login, plus the display name shown in the UI. The
/// token contents are never inspected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the stored session, or `None` when nobody is logged in.
    /// An unreadable or corrupt session file counts as logged out.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        let data = std::fs::read(&self.path).ok()?;
        serde_json::from_slice(&data).ok()
    }

    /// Like `load`, but turns absence into the error every privileged
    /// operation fails with before touching the network.
    pub fn require(&self) -> Result<Session, TaskuiError> {
        self.load().ok_or(TaskuiError::MissingSession)
    }

    pub fn save(&self, session: &Session) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(session)?;
        std::fs::write(&tmp, &data).with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path).with_context(|| {
            format!("failed to rename {} -> {}", tmp.display(), self.path.display())
        })?;
        Ok(())
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TaskuiError::IoPath {
                path: self.path.clone(),
                source: e,
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, SessionStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("session.json"));
        (dir, store)
    }

    #[test]
    fn save_load_roundtrip() {
        let (_dir, store) = store();
        assert!(store.load().is_none());

        let session = Session {
            token: "tok-123".to_owned(),
            name: "Ada".to_owned(),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));
    }

    #[test]
    fn clear_is_idempotent() {
        let (_dir, store) = store();
        store.clear().unwrap();

        store
            .save(&Session {
                token: "t".to_owned(),
                name: "n".to_owned(),
            })
            .unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn require_fails_without_session() {
        let (_dir, store) = store();
        let err = store.require().unwrap_err();
        assert!(matches!(err, TaskuiError::MissingSession));
    }

    #[test]
    fn corrupt_file_counts_as_logged_out() {
        let (_dir, store) = store();
        std::fs::write(store.path(), b"not json").unwrap();
        assert!(store.load().is_none());
    }
}
