//! Router configuration for Web API.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_share, current_share, delete_path, delete_root, download_file, get_space, list_files,
    list_shares, login, make_directory, me, register, revoke_share, upload_files, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth};

/// Files accepted per upload request at the per-file limit.
const MAX_FILES_PER_UPLOAD: u64 = 16;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let jwt_state = app_state.jwt.clone();
    let upload_limit = app_state
        .storage
        .max_file_size()
        .saturating_mul(MAX_FILES_PER_UPLOAD)
        .try_into()
        .unwrap_or(usize::MAX);

    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me));

    let file_routes = Router::new()
        .route("/files", get(list_files))
        .route(
            "/upload",
            post(upload_files).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/download/*path", get(download_file))
        .route("/delete", delete(delete_root))
        .route("/delete/*path", delete(delete_path))
        .route("/mkdir", post(make_directory))
        .route("/space", get(get_space));

    let share_routes = Router::new()
        .route("/", get(list_shares).post(create_share))
        .route("/current", get(current_share))
        .route("/:id", delete(revoke_share));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/shares", share_routes)
        .merge(file_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Serve the frontend from `static_path`, falling back to `index.html`.
///
/// Returns `None` if the directory does not exist.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let dir = Path::new(static_path);
    if !dir.is_dir() {
        tracing::warn!("Static path {} not found, frontend disabled", static_path);
        return None;
    }

    let index = ServeFile::new(dir.join("index.html"));
    Some(Router::new().fallback_service(ServeDir::new(dir).fallback(index)))
}
