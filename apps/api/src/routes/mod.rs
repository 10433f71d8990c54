pub mod health;
pub mod resumes;
pub mod roasts;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::upload::MAX_UPLOAD_BYTES;

/// Headroom over the upload limit so oversize PDFs reach validation and get
/// a proper reason instead of a bare 413.
const BODY_LIMIT_BYTES: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes", post(resumes::handle_upload))
        .route("/api/v1/resumes/:id/status", get(resumes::handle_get_status))
        .route(
            "/api/v1/resumes/:id/roast",
            get(resumes::handle_get_latest_roast),
        )
        .route("/api/v1/roasts", post(roasts::handle_request_roast))
        .route("/api/v1/roasts/:id", get(roasts::handle_get_roast))
        .route("/api/v1/share/:share_id", get(roasts::handle_get_shared))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        // Browser clients call the roast endpoint cross-origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Ids that do not parse cannot name an existing record.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("{what} not found")))
}
