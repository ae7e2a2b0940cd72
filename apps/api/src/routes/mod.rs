pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

/// Multipart framing overhead allowed on top of `MAX_UPLOAD_BYTES`.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/roles", get(handlers::handle_list_roles))
        // Resume API
        .route("/api/v1/resumes/parse", post(handlers::handle_parse))
        .route(
            "/api/v1/resumes/upload",
            post(handlers::handle_upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/resumes/score", post(handlers::handle_score))
        .route("/api/v1/resumes/recommend", post(handlers::handle_recommend))
        .route("/api/v1/resumes/match", post(handlers::handle_match))
        .route("/api/v1/resumes/analyze", post(handlers::handle_analyze))
        .with_state(state)
}
