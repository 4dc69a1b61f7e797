pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use api::{CourseClient, HttpCourseClient};
pub use auth::AuthFlow;
pub use config::AdminConfig;
pub use error::AppError;
pub use services::{PendingOp, RefreshScheduler, SyncService};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
