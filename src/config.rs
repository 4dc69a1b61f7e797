use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Runtime configuration, read from the environment (the binary loads a
/// `.env` file first via dotenvy).
#[derive(Clone, Debug)]
pub struct AdminConfig {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    /// When set, the binary keeps running and re-fetches the catalog on
    /// this interval instead of exiting after the first refresh.
    pub refresh_interval_secs: Option<u64>,
}

impl AdminConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let api_base_url = env::var("COURSE_API_URL")
            .map_err(|_| AppError::Config("COURSE_API_URL is not set".to_string()))?;
        let session_file = env::var("SESSION_FILE")
            .unwrap_or_else(|_| "session.json".to_string())
            .into();

        Ok(Self {
            api_base_url,
            session_file,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            refresh_interval_secs: env::var("REFRESH_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
        })
    }
}
