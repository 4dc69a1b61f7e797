pub mod dto;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::AdminConfig;
use crate::error::AppError;
use crate::models::{Course, CurrentSession};

/// Boundary to the remote course service. The auth flow and the sync
/// engine only ever talk to this trait, so tests swap in mocks.
#[async_trait]
pub trait CourseClient: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<dto::LoginResponse, AppError>;
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<dto::AckResponse, AppError>;
    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError>;
    async fn create_course(&self, course: &Course) -> Result<dto::MutationResponse, AppError>;
    async fn update_course(&self, course: &Course) -> Result<dto::MutationResponse, AppError>;
    async fn delete_course(&self, id: i64) -> Result<dto::AckResponse, AppError>;
}

/// `reqwest`-backed implementation. Attaches the bearer token from the
/// shared session handle on every request except login/register, where no
/// token exists yet.
pub struct HttpCourseClient {
    client: Client,
    base_url: String,
    session: CurrentSession,
}

impl HttpCourseClient {
    pub fn new(config: &AdminConfig, session: CurrentSession) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Connection(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn bearer_token(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.token.clone())
    }

    /// Sends the request and returns the raw body once the status checks
    /// out. Transport failures and non-2xx statuses are connection-class;
    /// what the body actually contains is judged by `parse`.
    async fn execute(&self, req: reqwest::RequestBuilder) -> Result<String, AppError> {
        let response = req
            .send()
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;

        if !status.is_success() {
            return Err(AppError::Connection(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }

    /// Tagged parse step: a body that is not the expected JSON (an HTML
    /// error page, for instance) is a protocol fault, not a network one.
    fn parse<T: DeserializeOwned>(&self, body: &str) -> Result<T, AppError> {
        serde_json::from_str::<T>(body).map_err(|e| {
            tracing::error!("failed to parse server response: {e}");
            AppError::Protocol(e.to_string())
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B, with_auth: bool) -> Result<T, AppError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let mut req = self.client.post(format!("{}{path}", self.base_url)).json(body);
        if with_auth {
            if let Some(token) = self.bearer_token() {
                req = req.header("Authorization", format!("Bearer {token}"));
            }
        }
        let body = self.execute(req).await?;
        self.parse(&body)
    }
}

#[async_trait]
impl CourseClient for HttpCourseClient {
    async fn login(&self, email: &str, password: &str) -> Result<dto::LoginResponse, AppError> {
        let req = dto::LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post_json("/auth/login", &req, false).await
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<dto::AckResponse, AppError> {
        let req = dto::RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        self.post_json("/auth/register", &req, false).await
    }

    async fn fetch_courses(&self) -> Result<Vec<Course>, AppError> {
        let mut req = self.client.get(format!("{}/courses", self.base_url));
        if let Some(token) = self.bearer_token() {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        let body = self.execute(req).await?;
        self.parse(&body)
    }

    async fn create_course(&self, course: &Course) -> Result<dto::MutationResponse, AppError> {
        self.post_json("/courses", course, true).await
    }

    async fn update_course(&self, course: &Course) -> Result<dto::MutationResponse, AppError> {
        self.post_json("/courses/update", course, true).await
    }

    async fn delete_course(&self, id: i64) -> Result<dto::AckResponse, AppError> {
        self.post_json("/courses/delete", &dto::DeleteRequest { id }, true)
            .await
    }
}
