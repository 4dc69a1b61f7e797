use std::sync::{Arc, RwLock};

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_admin::api::HttpCourseClient;
use course_admin::auth::AuthFlow;
use course_admin::config::AdminConfig;
use course_admin::models::CurrentSession;
use course_admin::services::{RefreshScheduler, SyncService};
use course_admin::store::FileSessionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "course_admin=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = AdminConfig::new_from_env()?;

    let current: CurrentSession = Arc::new(RwLock::new(None));
    let client = Arc::new(HttpCourseClient::new(&config, Arc::clone(&current))?);
    let store = Arc::new(FileSessionStore::new(config.session_file.clone()));
    let auth = AuthFlow::with_session_handle(client.clone(), store, Arc::clone(&current));

    let session = match auth.bootstrap() {
        Some(session) => session,
        None => match (&config.admin_email, &config.admin_password) {
            (Some(email), Some(password)) => auth.login(email, password).await?,
            _ => {
                warn!("no stored session and no ADMIN_EMAIL/ADMIN_PASSWORD set, aborting");
                return Ok(());
            }
        },
    };

    let engine = Arc::new(SyncService::new(client, current));

    engine.refresh().await?;
    let stats = engine.stats();
    info!(
        "signed in as {}: {} courses ({} active), {} students, {:.2} total revenue",
        session.email,
        stats.total_courses,
        stats.active_courses,
        stats.total_students,
        stats.total_revenue
    );

    for course in engine.courses() {
        info!(
            "  [{}] {} | {} / {} | ${:.2} ({} students, {})",
            course.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
            course.title,
            course.instructor,
            course.category,
            course.price,
            course.students,
            course.status
        );
    }

    if let Some(secs) = config.refresh_interval_secs {
        RefreshScheduler::new(engine, secs).start().await;
    }

    Ok(())
}
