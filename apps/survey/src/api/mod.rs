//! # Survey HTTP API Module
//!
//! This module implements the HTTP JSON API using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /status` - Response and session counts
//! - `GET /catalog` - Departments, tools and users
//! - `POST /sessions` - Start a survey session
//! - `GET /sessions/{id}` - Current wizard view
//! - `DELETE /sessions/{id}` - Drop a session
//! - `POST /sessions/{id}/actions` - Apply a wizard action
//! - `POST /sessions/{id}/admin/login` - Admin login
//! - `POST /sessions/{id}/admin/logout` - Admin logout
//! - `GET /sessions/{id}/admin/responses` - Collected responses (admin)
//! - `GET /sessions/{id}/admin/export` - CSV export (admin)
//!
//! ## Configuration (Environment Variables)
//!
//! - `SURVEY_ADMIN_PASSWORD`: Admin password; admin access is disabled without it
//! - `SURVEY_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `SURVEY_RATE_LIMIT`: Requests per second (default: 50, 0 to disable)

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::{ADMIN_PASSWORD_ENV, AdminGate};
pub use middleware::{create_rate_limiter, parse_rate_limit, rate_limit_from_env};
pub use types::{
    AdminResponse, CatalogResponse, DeleteResponse, DepartmentJson, EXPORT_CONTENT_TYPE,
    EXPORT_FILENAME, ExportResponse, HealthResponse, LoginRequest, NO_RESPONSES_MESSAGE,
    QuestionJson, ResponsesResponse, SessionResponse, StatusResponse, ToolJson, WizardView,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use survey_core::{Catalog, ResponseLog, SurveyError, SurveySession};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Maximum number of live sessions held in memory.
///
/// A new session beyond this evicts idle sessions first, then the least
/// recently used one.
pub const MAX_SESSIONS: usize = 10_000;

/// A session untouched for this long may be evicted when the map is full.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Maximum request body size.
const MAX_BODY_SIZE: usize = 64 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// A live session and the last time a request used it.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub session: SurveySession,
    pub last_seen: Instant,
}

impl SessionEntry {
    #[must_use]
    pub fn new(session: SurveySession) -> Self {
        Self {
            session,
            last_seen: Instant::now(),
        }
    }

    /// Mark the session as used now.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_seen)
    }
}

/// Shared server state.
///
/// Lock order is always `sessions` before `log`.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub sessions: Arc<RwLock<BTreeMap<String, SessionEntry>>>,
    pub log: Arc<RwLock<ResponseLog>>,
    pub admin: Arc<AdminGate>,
}

impl AppState {
    /// Create app state with no sessions.
    #[must_use]
    pub fn new(catalog: Catalog, log: ResponseLog, admin: AdminGate) -> Self {
        Self {
            catalog: Arc::new(catalog),
            sessions: Arc::new(RwLock::new(BTreeMap::new())),
            log: Arc::new(RwLock::new(log)),
            admin: Arc::new(admin),
        }
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

const CORS_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

/// Build CORS layer from `SURVEY_CORS_ORIGINS`.
///
/// - `*`: allows all origins
/// - unset or no valid entry: localhost only
/// - otherwise: the comma-separated list of origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("SURVEY_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!("CORS: Allowing ALL origins (SURVEY_CORS_ORIGINS=*)");
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(hv) => {
                        tracing::info!("CORS: Allowing origin: {}", origin);
                        Some(hv)
                    }
                    Err(e) => {
                        tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                        None
                    }
                })
                .collect();

            if allowed.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in SURVEY_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                cors_for(allowed)
            }
        }
        None => {
            tracing::info!("CORS: No SURVEY_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .into_iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();
    cors_for(origins)
}

fn cors_for(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(CORS_METHODS)
        .allow_headers([header::CONTENT_TYPE])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate limiting (if enabled)
pub fn create_router(state: AppState) -> Router {
    if state.admin.is_configured() {
        tracing::info!("Admin panel enabled");
    } else {
        tracing::warn!(
            "Admin panel DISABLED: set {} to allow admin logins",
            ADMIN_PASSWORD_ENV
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/status", get(handlers::status_handler))
        .route("/catalog", get(handlers::catalog_handler))
        .route("/sessions", post(handlers::create_session_handler))
        .route(
            "/sessions/{id}",
            get(handlers::get_session_handler).delete(handlers::delete_session_handler),
        )
        .route("/sessions/{id}/actions", post(handlers::action_handler))
        .route("/sessions/{id}/admin/login", post(handlers::login_handler))
        .route("/sessions/{id}/admin/logout", post(handlers::logout_handler))
        .route(
            "/sessions/{id}/admin/responses",
            get(handlers::responses_handler),
        )
        .route("/sessions/{id}/admin/export", get(handlers::export_handler));

    match rate_limit_from_env() {
        Some(rps) => {
            tracing::info!("Rate limiting enabled: {} requests/second", rps);
            router = router.layer(axum_middleware::from_fn_with_state(
                create_rate_limiter(rps),
                middleware::rate_limit_middleware,
            ));
        }
        None => tracing::info!("Rate limiting disabled"),
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors_layer())
                .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_SIZE)),
        )
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server and run until Ctrl+C.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), SurveyError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SurveyError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Survey HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| SurveyError::IoError(format!("Server error: {}", e)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
