//! Session store with durable token persistence
//!
//! The token lives in one plain-text slot under the data directory. It is
//! read once at startup to seed the initial state, written on login and
//! removed on logout. Token expiry is never validated here; an expired
//! token surfaces as an authorization failure on a later request.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use super::model::Session;
use crate::error::Error;
use crate::Result;

/// Thread-safe session store backed by a token slot on disk
#[derive(Clone)]
pub struct SessionStore {
    session: Arc<RwLock<Session>>,
    slot_path: PathBuf,
}

impl SessionStore {
    /// Create a store seeded from the slot at `slot_path`.
    ///
    /// A missing or empty slot yields an anonymous session.
    pub async fn load(slot_path: PathBuf) -> Result<Self> {
        let session = match tokio::fs::read_to_string(&slot_path).await {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    Session::anonymous()
                } else {
                    Session::authenticated(token)
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Session::anonymous(),
            Err(e) => return Err(Error::Io(e)),
        };

        Ok(Self {
            session: Arc::new(RwLock::new(session)),
            slot_path,
        })
    }

    /// Current session snapshot
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    /// Current token, if authenticated
    pub async fn token(&self) -> Option<String> {
        self.session.read().await.token.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    /// Enter the authenticated state and persist the token.
    ///
    /// Calling this again with the same token is valid and leaves the
    /// store in the same state.
    pub async fn login_success(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        {
            let mut session = self.session.write().await;
            *session = Session::authenticated(token.clone());
        }
        self.persist(&token).await?;
        debug!("Session token stored");
        Ok(())
    }

    /// Return to the anonymous state and clear the slot.
    ///
    /// Valid no-op when already anonymous.
    pub async fn logout(&self) -> Result<()> {
        {
            let mut session = self.session.write().await;
            *session = Session::anonymous();
        }
        match tokio::fs::remove_file(&self.slot_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::Storage(format!("Failed to clear token slot: {}", e)));
            }
        }
        debug!("Session token cleared");
        Ok(())
    }

    async fn persist(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.slot_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("Failed to create data directory: {}", e)))?;
        }
        tokio::fs::write(&self.slot_path, token)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write token slot: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_without_slot_is_anonymous() {
        let dir = tempdir().unwrap();
        let store = SessionStore::load(dir.path().join("token")).await.unwrap();

        assert!(!store.is_authenticated().await);
        assert!(store.token().await.is_none());
    }

    #[tokio::test]
    async fn test_login_persists_the_token() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token");

        let store = SessionStore::load(path.clone()).await.unwrap();
        store.login_success("tok-1").await.unwrap();

        assert!(store.is_authenticated().await);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "tok-1");

        // A fresh store seeded from the same slot resumes the session.
        let resumed = SessionStore::load(path).await.unwrap();
        assert_eq!(resumed.token().await.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_login_twice_with_same_token_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = SessionStore::load(dir.path().join("token")).await.unwrap();

        store.login_success("tok-1").await.unwrap();
        store.login_success("tok-1").await.unwrap();

        assert_eq!(store.token().await.as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_logout_matches_the_pre_login_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token");

        let store = SessionStore::load(path.clone()).await.unwrap();
        let before = store.session().await;

        store.login_success("tok-1").await.unwrap();
        store.logout().await.unwrap();

        assert_eq!(store.session().await, before);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_logout_when_anonymous_is_a_noop() {
        let dir = tempdir().unwrap();
        let store = SessionStore::load(dir.path().join("token")).await.unwrap();

        store.logout().await.unwrap();
        assert!(!store.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_empty_slot_is_anonymous() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "  \n").unwrap();

        let store = SessionStore::load(path).await.unwrap();
        assert!(!store.is_authenticated().await);
    }
}
