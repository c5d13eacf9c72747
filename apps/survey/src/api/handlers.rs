//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState, MAX_SESSIONS, SESSION_IDLE_TIMEOUT, SessionEntry,
    types::{
        AdminResponse, CatalogResponse, DeleteResponse, ExportResponse, HealthResponse,
        LoginRequest, ResponsesResponse, SessionResponse, StatusResponse, WizardView,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::collections::BTreeMap;
use std::time::Instant;
use survey_core::{ResponseLog, SurveyError, SurveySession, WizardAction};

const SESSION_NOT_FOUND: &str = "Session not found";
const ADMIN_REQUIRED: &str = "Admin login required";

/// HTTP status for a core error.
fn error_status(error: &SurveyError) -> StatusCode {
    match error {
        e if e.is_validation() => StatusCode::UNPROCESSABLE_ENTITY,
        SurveyError::WrongStep { .. }
        | SurveyError::CannotGoBack(_)
        | SurveyError::IncompleteSession(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Free slots in a full session map.
///
/// Sessions idle past [`SESSION_IDLE_TIMEOUT`] go first; if the map is still
/// at `limit`, the least recently used ones follow, admin sessions last.
/// Returns how many sessions were evicted.
fn make_room(sessions: &mut BTreeMap<String, SessionEntry>, limit: usize, now: Instant) -> usize {
    if sessions.len() < limit {
        return 0;
    }

    let before = sessions.len();
    sessions.retain(|_, entry| entry.idle_for(now) < SESSION_IDLE_TIMEOUT);

    while sessions.len() >= limit {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, entry)| (entry.session.is_admin(), entry.last_seen))
            .map(|(id, _)| id.clone());
        match oldest {
            Some(id) => {
                sessions.remove(&id);
            }
            None => break,
        }
    }

    before - sessions.len()
}

/// Submission time, in server local time.
fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

// =============================================================================
// HEALTH / STATUS / CATALOG
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// Server status.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let active_sessions = state.sessions.read().await.len();
    let log = state.log.read().await;

    let response = StatusResponse {
        response_count: log.len(),
        active_sessions,
        department_count: state.catalog.departments().len(),
        tool_count: state.catalog.pairs().count(),
        persistent: log.mirror_path().is_some(),
        admin_enabled: state.admin.is_configured(),
    };

    (StatusCode::OK, Json(response))
}

/// Catalog listing for selectors.
pub async fn catalog_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(CatalogResponse::from(state.catalog.as_ref()))
}

// =============================================================================
// SESSION HANDLERS
// =============================================================================

/// Start a new survey session at step 1.
pub async fn create_session_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut sessions = state.sessions.write().await;
    let evicted = make_room(&mut sessions, MAX_SESSIONS, Instant::now());
    if evicted > 0 {
        tracing::warn!(
            event = "sessions_evicted",
            evicted,
            limit = MAX_SESSIONS,
            "Session limit reached; dropped stale sessions"
        );
    }

    let mut id = nanoid::nanoid!();
    while sessions.contains_key(&id) {
        id = nanoid::nanoid!();
    }
    let session = SurveySession::new();
    let view = WizardView::new(&id, &session, &state.catalog);
    sessions.insert(id.clone(), SessionEntry::new(session));
    tracing::debug!(event = "session_created", session_id = %id);

    (StatusCode::CREATED, Json(SessionResponse::success(view)))
}

/// Current wizard view of a session.
pub async fn get_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.write().await;
    match sessions.get_mut(&id) {
        Some(entry) => {
            entry.touch();
            (
                StatusCode::OK,
                Json(SessionResponse::success(WizardView::new(
                    &id,
                    &entry.session,
                    &state.catalog,
                ))),
            )
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(SessionResponse::error(SESSION_NOT_FOUND)),
        ),
    }
}

/// Drop a session, admin flag included.
pub async fn delete_session_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.write().await;
    if sessions.remove(&id).is_some() {
        tracing::debug!(event = "session_deleted", session_id = %id);
        (
            StatusCode::OK,
            Json(DeleteResponse {
                success: true,
                error: None,
            }),
        )
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(DeleteResponse {
                success: false,
                error: Some(SESSION_NOT_FOUND.to_string()),
            }),
        )
    }
}

// =============================================================================
// ACTION HANDLER
// =============================================================================

/// Apply one wizard action.
///
/// A successful submit appends the response to the log before replying.
/// The mirror file is rewritten on the blocking pool after the session lock
/// is released; a failed write is logged and the response stays in memory.
pub async fn action_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(action): Json<WizardAction>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.write().await;
    let Some(entry) = sessions.get_mut(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(SessionResponse::error(SESSION_NOT_FOUND)),
        );
    };
    entry.touch();

    let response = match entry.session.apply(&state.catalog, action, now()) {
        Ok(None) => {
            return (
                StatusCode::OK,
                Json(SessionResponse::success(WizardView::new(
                    &id,
                    &entry.session,
                    &state.catalog,
                ))),
            );
        }
        Ok(Some(response)) => response,
        Err(e) => {
            tracing::debug!(event = "action_rejected", session_id = %id, error = %e);
            return (
                error_status(&e),
                Json(SessionResponse::rejected(
                    WizardView::new(&id, &entry.session, &state.catalog),
                    e.to_string(),
                )),
            );
        }
    };

    let view = WizardView::new(&id, &entry.session, &state.catalog);
    drop(sessions);

    let department = response.department().to_string();
    let tool = response.tool().to_string();
    let question_set = response.question_set();

    // Held across the write so mirror snapshots land in append order.
    let mut log = state.log.write().await;
    let position = log.push(response);
    let (persisted, mirror_error) = match log.mirror_snapshot() {
        Some((path, csv)) => {
            let written =
                tokio::task::spawn_blocking(move || ResponseLog::write_mirror(&path, &csv))
                    .await
                    .unwrap_or_else(|e| {
                        Err(SurveyError::IoError(format!("Mirror write task failed: {}", e)))
                    });
            (written.is_ok(), written.err())
        }
        None => (false, None),
    };
    drop(log);

    if let Some(e) = &mirror_error {
        tracing::warn!(
            event = "mirror_write_failed",
            error = %e,
            "Response kept in memory only"
        );
    }
    tracing::info!(
        event = "response_submitted",
        department = %department,
        tool = %tool,
        question_set = %question_set,
        position,
        persisted,
        "Survey response recorded"
    );

    (StatusCode::OK, Json(SessionResponse::submitted(view)))
}

// =============================================================================
// ADMIN HANDLERS
// =============================================================================

/// Admin login for one session.
pub async fn login_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<LoginRequest>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.write().await;
    let Some(entry) = sessions.get_mut(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(AdminResponse::error(SESSION_NOT_FOUND)),
        );
    };
    entry.touch();

    if !state.admin.is_configured() {
        tracing::warn!(
            event = "admin_login_failure",
            reason = "not_configured",
            "Admin login refused: no admin password configured"
        );
        return (
            StatusCode::FORBIDDEN,
            Json(AdminResponse::error("Admin access is disabled")),
        );
    }

    if state.admin.verify(&request.password) {
        entry.session.grant_admin();
        tracing::info!(event = "admin_login", session_id = %id);
        (StatusCode::OK, Json(AdminResponse::success(true)))
    } else {
        tracing::warn!(
            event = "admin_login_failure",
            reason = "incorrect_password",
            "Admin login failed"
        );
        (
            StatusCode::UNAUTHORIZED,
            Json(AdminResponse::error("Incorrect password")),
        )
    }
}

/// Admin logout. Clears the flag; the wizard is untouched.
pub async fn logout_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.write().await;
    match sessions.get_mut(&id) {
        Some(entry) => {
            entry.touch();
            entry.session.revoke_admin();
            tracing::info!(event = "admin_logout", session_id = %id);
            (StatusCode::OK, Json(AdminResponse::success(false)))
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(AdminResponse::error(SESSION_NOT_FOUND)),
        ),
    }
}

/// Check that the session exists and is admin.
async fn require_admin(state: &AppState, id: &str) -> Result<(), (StatusCode, &'static str)> {
    let sessions = state.sessions.read().await;
    match sessions.get(id) {
        Some(entry) if entry.session.is_admin() => Ok(()),
        Some(_) => Err((StatusCode::UNAUTHORIZED, ADMIN_REQUIRED)),
        None => Err((StatusCode::NOT_FOUND, SESSION_NOT_FOUND)),
    }
}

/// All responses as a table.
pub async fn responses_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err((status, msg)) = require_admin(&state, &id).await {
        return (status, Json(ResponsesResponse::error(msg)));
    }

    let log = state.log.read().await;
    (StatusCode::OK, Json(ResponsesResponse::from_table(log.table())))
}

/// CSV download, base64 encoded, formula prefixes neutralized.
pub async fn export_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if let Err((status, msg)) = require_admin(&state, &id).await {
        return (status, Json(ExportResponse::error(msg)));
    }

    let log = state.log.read().await;
    tracing::info!(event = "responses_exported", count = log.len());
    (
        StatusCode::OK,
        Json(ExportResponse::success(&log.export_csv(), log.len())),
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use survey_core::Step;

    fn entry_at(last_seen: Instant, admin: bool) -> SessionEntry {
        let mut session = SurveySession::new();
        if admin {
            session.grant_admin();
        }
        SessionEntry {
            session,
            last_seen,
        }
    }

    #[test]
    fn room_is_left_alone_below_the_limit() {
        let base = Instant::now();
        let mut sessions = BTreeMap::new();
        sessions.insert("a".to_string(), entry_at(base, false));
        let later = base + SESSION_IDLE_TIMEOUT * 2;
        assert_eq!(make_room(&mut sessions, 2, later), 0);
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn idle_sessions_are_evicted_first() {
        let base = Instant::now();
        let now = base + SESSION_IDLE_TIMEOUT + Duration::from_secs(1);
        let mut sessions = BTreeMap::new();
        sessions.insert("idle-1".to_string(), entry_at(base, false));
        sessions.insert("idle-2".to_string(), entry_at(base, true));
        sessions.insert("fresh".to_string(), entry_at(now, false));

        assert_eq!(make_room(&mut sessions, 3, now), 2);
        assert_eq!(sessions.keys().collect::<Vec<_>>(), vec!["fresh"]);
    }

    #[test]
    fn least_recently_used_goes_when_none_are_idle() {
        let base = Instant::now();
        let now = base + Duration::from_secs(100);
        let mut sessions = BTreeMap::new();
        sessions.insert("admin".to_string(), entry_at(base + Duration::from_secs(10), true));
        sessions.insert("older".to_string(), entry_at(base + Duration::from_secs(40), false));
        sessions.insert("newer".to_string(), entry_at(base + Duration::from_secs(95), false));

        assert_eq!(make_room(&mut sessions, 3, now), 1);
        assert!(!sessions.contains_key("older"));
        assert!(sessions.contains_key("admin"));
        assert!(sessions.contains_key("newer"));
    }

    #[test]
    fn validation_errors_are_unprocessable() {
        let e = SurveyError::SystemNumberTooShort { min: 5 };
        assert_eq!(error_status(&e), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn navigation_errors_conflict() {
        let e = SurveyError::WrongStep {
            expected: Step::Tool,
            actual: Step::Department,
        };
        assert_eq!(error_status(&e), StatusCode::CONFLICT);
        assert_eq!(
            error_status(&SurveyError::CannotGoBack(Step::Department)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn io_errors_are_internal() {
        let e = SurveyError::IoError("disk".into());
        assert_eq!(error_status(&e), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
