use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

/// Authenticated admin identity plus the opaque bearer credential. Only the
/// auth flow constructs these; a session with an empty token never exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: i64,
    pub display_name: String,
    pub email: String,
    pub token: String,
}

/// Process-wide handle to the signed-in session. The auth flow writes it,
/// the HTTP client reads the token from it, and the sync engine reads the
/// owner id from it. `None` means unauthenticated.
pub type CurrentSession = Arc<RwLock<Option<Session>>>;
