use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;
use crate::models::Session;

/// Raw persisted session record, exactly as stored: the `session.user` and
/// `session.token` keys plus an informational write stamp. No validation
/// happens here; the auth flow decides whether the record is complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSession {
    #[serde(rename = "session.user", default)]
    pub user: Option<StoredUser>,
    #[serde(rename = "session.token", default)]
    pub token: Option<String>,
    #[serde(rename = "savedAt", default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Dumb keyed persistence for the session. Implementations never validate
/// what they hand back.
pub trait SessionStore: Send + Sync {
    fn save(&self, session: &Session) -> Result<(), AppError>;
    fn load(&self) -> Option<StoredSession>;
    /// Removes all session keys. Never fails; IO problems are logged.
    fn clear(&self);
}

fn record_from(session: &Session) -> StoredSession {
    StoredSession {
        user: Some(StoredUser {
            user_id: Some(session.user_id),
            display_name: Some(session.display_name.clone()),
            email: Some(session.email.clone()),
        }),
        token: Some(session.token.clone()),
        saved_at: Some(Utc::now().to_rfc3339()),
    }
}

/// JSON-file-backed store, the durable analogue of browser local storage.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &Session) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(&record_from(session))
            .map_err(|e| AppError::Storage(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| AppError::Storage(e.to_string()))
    }

    fn load(&self) -> Option<StoredSession> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("session file unreadable, treating as absent: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("session file unparsable, treating as absent: {e}");
                None
            }
        }
    }

    fn clear(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to clear session file: {e}");
            }
        }
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Default)]
pub struct MemorySessionStore {
    record: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an arbitrary raw record, bypassing `save`'s well-formedness.
    pub fn seed(&self, record: StoredSession) {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(record);
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &Session) -> Result<(), AppError> {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = Some(record_from(session));
        Ok(())
    }

    fn load(&self) -> Option<StoredSession> {
        self.record.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn clear(&self) {
        *self.record.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}
