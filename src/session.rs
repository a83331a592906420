use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SessionError;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: SessionUser,
    pub signed_in_at: DateTime<Utc>,
}

/// Issues the logged-in identity. Verification itself happens upstream.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> SessionResult<Option<Session>>;

    async fn current_user(&self) -> SessionResult<Option<SessionUser>> {
        Ok(self.current_session().await?.map(|session| session.user))
    }

    async fn sign_out(&self) -> SessionResult<()>;
}

/// Keeps the verified identity in a small JSON file between commands.
pub struct FileSession {
    path: PathBuf,
}

impl FileSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn sign_in(&self, id: Uuid, email: &str) -> SessionResult<Session> {
        let session = Session {
            user: SessionUser {
                id,
                email: email.trim().to_string(),
            },
            signed_in_at: Utc::now(),
        };
        let body = serde_json::to_vec_pretty(&session)?;
        tokio::fs::write(&self.path, body).await?;
        info!(user_id = %id, path = %self.path.display(), "session stored");
        Ok(session)
    }
}

#[async_trait]
impl SessionProvider for FileSession {
    async fn current_session(&self) -> SessionResult<Option<Session>> {
        let body = match tokio::fs::read(&self.path).await {
            Ok(body) => body,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no session file");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&body)?))
    }

    async fn sign_out(&self) -> SessionResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                info!(path = %self.path.display(), "session cleared");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Fixed identity for tests.
#[cfg(test)]
pub struct StaticSession(pub std::sync::Mutex<Option<Session>>);

#[cfg(test)]
impl StaticSession {
    pub fn signed_in(id: Uuid, email: &str) -> Self {
        Self(std::sync::Mutex::new(Some(Session {
            user: SessionUser {
                id,
                email: email.to_string(),
            },
            signed_in_at: Utc::now(),
        })))
    }

    pub fn anonymous() -> Self {
        Self(std::sync::Mutex::new(None))
    }
}

#[cfg(test)]
#[async_trait]
impl SessionProvider for StaticSession {
    async fn current_session(&self) -> SessionResult<Option<Session>> {
        Ok(self.0.lock().expect("session lock").clone())
    }

    async fn sign_out(&self) -> SessionResult<()> {
        *self.0.lock().expect("session lock") = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_in_then_out() {
        let dir = tempfile::tempdir().unwrap();
        let sessions = FileSession::new(dir.path().join("session.json"));
        assert!(sessions.current_session().await.unwrap().is_none());

        let id = Uuid::new_v4();
        sessions.sign_in(id, " ana@example.com ").await.unwrap();
        let user = sessions.current_user().await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email, "ana@example.com");

        sessions.sign_out().await.unwrap();
        assert!(sessions.current_session().await.unwrap().is_none());
        sessions.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_session_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(FileSession::new(path).current_session().await.is_err());
    }
}
