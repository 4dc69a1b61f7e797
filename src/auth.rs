use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::api::CourseClient;
use crate::error::AppError;
use crate::models::{CurrentSession, Session};
use crate::store::SessionStore;

/// Exchanges credentials for a session and gates everything behind it.
///
/// Owns the shared current-session handle: a successful login or bootstrap
/// publishes the session there, logout and corruption detection clear it.
pub struct AuthFlow {
    client: Arc<dyn CourseClient>,
    store: Arc<dyn SessionStore>,
    current: CurrentSession,
}

impl AuthFlow {
    pub fn new(client: Arc<dyn CourseClient>, store: Arc<dyn SessionStore>) -> Self {
        Self::with_session_handle(client, store, Arc::new(RwLock::new(None)))
    }

    /// Wires the flow to an existing handle, for callers that had to hand
    /// the same handle to the HTTP client first.
    pub fn with_session_handle(
        client: Arc<dyn CourseClient>,
        store: Arc<dyn SessionStore>,
        current: CurrentSession,
    ) -> Self {
        Self {
            client,
            store,
            current,
        }
    }

    /// Handle for collaborators that need the signed-in identity (the HTTP
    /// client for the bearer header, the sync engine for the owner id).
    pub fn current(&self) -> CurrentSession {
        Arc::clone(&self.current)
    }

    pub fn session(&self) -> Option<Session> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn publish(&self, session: Option<Session>) {
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = session;
    }

    /// Signs in. The server saying `success: true` is not enough: the
    /// response must carry a user id, a display name and a bearer token,
    /// otherwise it is treated as incomplete rather than as a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let response = self.client.login(email, password).await?;

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "login rejected".to_string());
            return Err(AppError::RemoteRejected(message));
        }

        let user = response
            .user
            .ok_or_else(|| AppError::IncompleteResponse("user record missing".to_string()))?;
        let user_id = user
            .id
            .ok_or_else(|| AppError::IncompleteResponse("user id missing".to_string()))?;
        let display_name = user
            .name
            .filter(|n| !n.is_empty())
            .ok_or_else(|| AppError::IncompleteResponse("display name missing".to_string()))?;
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::IncompleteResponse("token missing".to_string()))?;

        let session = Session {
            user_id,
            display_name,
            email: user.email.unwrap_or_else(|| email.to_string()),
            token,
        };

        self.store.save(&session)?;
        self.publish(Some(session.clone()));
        info!("signed in as {} (user {})", session.email, session.user_id);
        Ok(session)
    }

    /// Registers and immediately logs in with the same credentials;
    /// registration alone yields no token. The password confirmation is
    /// checked locally first, before any network traffic.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Session, AppError> {
        if password != confirm_password {
            return Err(AppError::PasswordMismatch);
        }

        let response = self.client.register(name, email, password).await?;
        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "registration rejected".to_string());
            return Err(AppError::RemoteRejected(message));
        }

        self.login(email, password).await
    }

    /// Clears the store and the published session unconditionally.
    pub fn logout(&self) {
        self.store.clear();
        self.publish(None);
        info!("signed out");
    }

    /// Restores the session at process start. A stored record missing
    /// either the user id or the token is corrupt: the store is cleared
    /// and no session is restored.
    pub fn bootstrap(&self) -> Option<Session> {
        let record = self.store.load()?;

        let user = record.user.unwrap_or_default();
        let session = match (user.user_id, record.token) {
            (Some(user_id), Some(token)) if !token.is_empty() => Session {
                user_id,
                display_name: user.display_name.unwrap_or_default(),
                email: user.email.unwrap_or_default(),
                token,
            },
            _ => {
                warn!("stored session is incomplete, discarding it");
                self.store.clear();
                return None;
            }
        };

        self.publish(Some(session.clone()));
        info!("restored session for {} (user {})", session.email, session.user_id);
        Some(session)
    }
}
