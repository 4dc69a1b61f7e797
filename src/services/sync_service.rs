use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::api::CourseClient;
use crate::error::AppError;
use crate::models::{CatalogStats, Course, CourseDraft, CurrentSession};

/// How long a success confirmation stays visible before it clears itself.
pub const DEFAULT_SUCCESS_TTL: Duration = Duration::from_secs(3);

/// Operation kinds the view can key loading indicators on, one per form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingOp {
    Refresh,
    Create,
    Update,
    Delete,
}

struct Banner {
    message: String,
    expires_at: Instant,
}

#[derive(Default)]
struct EngineState {
    courses: Vec<Course>,
    applied_ticket: u64,
    in_flight: HashMap<PendingOp, u32>,
    last_error: Option<AppError>,
    success: Option<Banner>,
}

/// Single source of truth for the admin-visible course collection.
///
/// Every mutation goes through the remote service and, once confirmed, a
/// full refresh; the local collection is only ever replaced wholesale by a
/// completed fetch. Failed mutations leave it untouched: stale data plus
/// an error banner, never an unconfirmed optimistic state.
///
/// Refresh ordering: each refresh takes a ticket from a monotonically
/// increasing counter when it is issued, and a completion may only replace
/// the collection if its ticket is newer than the last one applied. An
/// older response arriving late is discarded, so rapid consecutive
/// refreshes can never leave older data on screen.
pub struct SyncService {
    client: Arc<dyn CourseClient>,
    session: CurrentSession,
    success_ttl: Duration,
    refresh_ticket: AtomicU64,
    state: Mutex<EngineState>,
}

/// Keeps the per-form loading flag set for as long as the operation runs,
/// including the refresh that follows a confirmed mutation.
struct OpGuard<'a> {
    service: &'a SyncService,
    op: PendingOp,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.service.state();
        if let Some(count) = state.in_flight.get_mut(&self.op) {
            *count -= 1;
            if *count == 0 {
                state.in_flight.remove(&self.op);
            }
        }
    }
}

impl SyncService {
    pub fn new(client: Arc<dyn CourseClient>, session: CurrentSession) -> Self {
        Self {
            client,
            session,
            success_ttl: DEFAULT_SUCCESS_TTL,
            refresh_ticket: AtomicU64::new(0),
            state: Mutex::new(EngineState::default()),
        }
    }

    pub fn with_success_ttl(mut self, ttl: Duration) -> Self {
        self.success_ttl = ttl;
        self
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self, op: PendingOp) -> OpGuard<'_> {
        *self.state().in_flight.entry(op).or_insert(0) += 1;
        OpGuard { service: self, op }
    }

    fn owner_id(&self) -> Result<i64, AppError> {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|s| s.user_id)
            .ok_or(AppError::SessionCorrupt)
    }

    /// Records the failure for the banner and hands it back to the caller.
    fn fail(&self, err: AppError) -> AppError {
        self.state().last_error = Some(err.clone());
        err
    }

    fn announce(&self, message: &str) {
        self.state().success = Some(Banner {
            message: message.to_string(),
            expires_at: Instant::now() + self.success_ttl,
        });
    }

    /// Fetches the full collection and replaces the local one wholesale.
    /// Safe to call concurrently with itself; see the ticket rule above.
    pub async fn refresh(&self) -> Result<Vec<Course>, AppError> {
        let ticket = self.refresh_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = self.begin(PendingOp::Refresh);

        match self.client.fetch_courses().await {
            Ok(courses) => {
                let mut state = self.state();
                if ticket > state.applied_ticket {
                    state.applied_ticket = ticket;
                    state.courses = courses;
                    info!("catalog refreshed: {} courses", state.courses.len());
                } else {
                    warn!(
                        "discarding stale refresh result (ticket {ticket}, newest {})",
                        state.applied_ticket
                    );
                }
                Ok(state.courses.clone())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Creates a course owned by the signed-in user. Required fields are
    /// validated locally first; an invalid draft never reaches the wire.
    pub async fn create(&self, draft: CourseDraft) -> Result<Course, AppError> {
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(self.fail(AppError::Validation(missing)));
        }
        let owner_id = match self.owner_id() {
            Ok(id) => id,
            Err(e) => return Err(self.fail(e)),
        };
        let payload = draft.into_course(owner_id);

        let _guard = self.begin(PendingOp::Create);
        let response = match self.client.create_course(&payload).await {
            Ok(r) => r,
            Err(e) => return Err(self.fail(e)),
        };
        if !response.success {
            return Err(self.fail(AppError::RemoteRejected(rejection(response.message))));
        }

        // The dialog just completed; whatever error it was showing is gone.
        self.state().last_error = None;
        let after = match self.refresh().await {
            Ok(list) => list,
            Err(_) => self.courses(),
        };

        let created = match response.data {
            Some(course) => course,
            None => match newest_owned(&after, owner_id, &payload.title) {
                Some(course) => course,
                None => {
                    return Err(self.fail(AppError::IncompleteResponse(
                        "created course missing from refreshed catalog".to_string(),
                    )));
                }
            },
        };

        self.announce("Course created");
        Ok(created)
    }

    /// Updates an existing course. Fields the dialog does not edit
    /// (student count, ownership) are carried over from the local copy.
    pub async fn update(&self, id: Option<i64>, draft: CourseDraft) -> Result<Course, AppError> {
        let id = match id {
            Some(id) => id,
            None => return Err(self.fail(AppError::MissingId)),
        };
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            return Err(self.fail(AppError::Validation(missing)));
        }
        let owner_id = match self.owner_id() {
            Ok(owner) => owner,
            Err(e) => return Err(self.fail(e)),
        };

        let existing = self
            .state()
            .courses
            .iter()
            .find(|c| c.id == Some(id))
            .cloned();
        let mut payload =
            draft.into_course(existing.as_ref().map(|c| c.owner_id).unwrap_or(owner_id));
        payload.id = Some(id);
        payload.students = existing.map(|c| c.students).unwrap_or(0);

        let _guard = self.begin(PendingOp::Update);
        let response = match self.client.update_course(&payload).await {
            Ok(r) => r,
            Err(e) => return Err(self.fail(e)),
        };
        if !response.success {
            return Err(self.fail(AppError::RemoteRejected(rejection(response.message))));
        }

        self.state().last_error = None;
        let after = match self.refresh().await {
            Ok(list) => list,
            Err(_) => self.courses(),
        };

        let updated = match response.data {
            Some(course) => course,
            None => match after.iter().find(|c| c.id == Some(id)).cloned() {
                Some(course) => course,
                None => {
                    return Err(self.fail(AppError::IncompleteResponse(
                        "updated course missing from refreshed catalog".to_string(),
                    )));
                }
            },
        };

        self.announce("Course updated");
        Ok(updated)
    }

    /// Deletes by id. Not assumed idempotent: the server is authoritative
    /// on existence, so deleting an already-deleted id is a rejection.
    pub async fn delete(&self, id: Option<i64>) -> Result<(), AppError> {
        let id = match id {
            Some(id) => id,
            None => return Err(self.fail(AppError::MissingId)),
        };

        let _guard = self.begin(PendingOp::Delete);
        let response = match self.client.delete_course(id).await {
            Ok(r) => r,
            Err(e) => return Err(self.fail(e)),
        };
        if !response.success {
            return Err(self.fail(AppError::RemoteRejected(rejection(response.message))));
        }

        self.state().last_error = None;
        let _ = self.refresh().await;
        self.announce("Course deleted");
        Ok(())
    }

    /// Case-insensitive substring match on title, instructor and category,
    /// narrowed by an exact category filter when one is given. Pure: reads
    /// a snapshot, never mutates, never touches the network.
    pub fn search(&self, term: &str, category: Option<&str>) -> Vec<Course> {
        let needle = term.trim().to_lowercase();
        self.state()
            .courses
            .iter()
            .filter(|c| {
                let term_hit = needle.is_empty()
                    || c.title.to_lowercase().contains(&needle)
                    || c.instructor.to_lowercase().contains(&needle)
                    || c.category.to_lowercase().contains(&needle);
                let category_hit = category.is_none_or(|cat| c.category == cat);
                term_hit && category_hit
            })
            .cloned()
            .collect()
    }

    /// Admin projection: the whole collection, all statuses.
    pub fn courses(&self) -> Vec<Course> {
        self.state().courses.clone()
    }

    /// Public projection: active courses only.
    pub fn public_catalog(&self) -> Vec<Course> {
        self.state()
            .courses
            .iter()
            .filter(|c| c.is_public())
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let state = self.state();
        CatalogStats {
            total_courses: state.courses.len(),
            active_courses: state.courses.iter().filter(|c| c.is_public()).count(),
            total_students: state.courses.iter().map(|c| u64::from(c.students)).sum(),
            total_revenue: state
                .courses
                .iter()
                .map(|c| c.price * f64::from(c.students))
                .sum(),
        }
    }

    /// Most recent failure, retained until the next confirmed mutation or
    /// an explicit dismissal. A background refresh succeeding does not
    /// clear it.
    pub fn last_error(&self) -> Option<AppError> {
        self.state().last_error.clone()
    }

    pub fn dismiss_error(&self) {
        self.state().last_error = None;
    }

    /// Transient success confirmation; reads as `None` once its TTL has
    /// elapsed, with no dismissal required.
    pub fn success_message(&self) -> Option<String> {
        let mut state = self.state();
        match &state.success {
            Some(banner) if Instant::now() < banner.expires_at => Some(banner.message.clone()),
            Some(_) => {
                state.success = None;
                None
            }
            None => None,
        }
    }

    /// Whether a request of this kind is outstanding, so the view can
    /// disable the submitting control and prevent duplicate submissions.
    pub fn is_loading(&self, op: PendingOp) -> bool {
        self.state().in_flight.get(&op).copied().unwrap_or(0) > 0
    }
}

fn rejection(message: Option<String>) -> String {
    message.unwrap_or_else(|| "the server rejected the request".to_string())
}

/// Locates a just-created course when the server did not echo it back:
/// the newest id among the caller's courses with the submitted title.
fn newest_owned(courses: &[Course], owner_id: i64, title: &str) -> Option<Course> {
    courses
        .iter()
        .filter(|c| c.owner_id == owner_id && c.title == title)
        .max_by_key(|c| c.id)
        .cloned()
}
