//! Axum route handlers for roast requests and retrieval.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::roast::RoastView;
use crate::pipeline::{process_roast, Degradation, PipelineError};
use crate::routes::parse_id;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoastRequest {
    #[serde(default)]
    pub resume_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoastResponse {
    #[serde(flatten)]
    pub roast: RoastView,
    /// Upstream failures masked by fallbacks; empty for a fully live roast.
    pub degraded: Vec<Degradation>,
}

#[derive(Debug, Serialize)]
pub struct SharedRoastResponse {
    pub content: String,
}

impl From<PipelineError> for AppError {
    fn from(error: PipelineError) -> Self {
        match error {
            PipelineError::NotFound(_) => AppError::NotFound("Resume not found".to_string()),
            PipelineError::Persistence(e) => AppError::Persistence(e),
        }
    }
}

/// POST /api/v1/roasts
///
/// Runs the roast pipeline synchronously and returns the new roast.
pub async fn handle_request_roast(
    State(state): State<AppState>,
    Json(request): Json<RoastRequest>,
) -> Result<Json<RoastResponse>, AppError> {
    let raw_id = request
        .resume_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Resume ID is required".to_string()))?;
    let resume_id = parse_id(raw_id.trim(), "Resume")?;

    let outcome = process_roast(&state, resume_id).await?;

    Ok(Json(RoastResponse {
        roast: RoastView::from(outcome.roast),
        degraded: outcome.degradations,
    }))
}

/// GET /api/v1/roasts/:id
pub async fn handle_get_roast(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoastView>, AppError> {
    let roast_id = parse_id(&id, "Roast")?;
    let roast = state
        .store
        .get_roast(roast_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Roast not found".to_string()))?;
    Ok(Json(RoastView::from(roast)))
}

/// GET /api/v1/share/:share_id
///
/// Anonymous read of one roast's content; the parent résumé stays hidden.
pub async fn handle_get_shared(
    State(state): State<AppState>,
    Path(share_id): Path<String>,
) -> Result<Json<SharedRoastResponse>, AppError> {
    let share_id = parse_id(&share_id, "Roast")?;
    let roast = state
        .store
        .get_roast_by_share_id(share_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Roast not found".to_string()))?;
    Ok(Json(SharedRoastResponse {
        content: roast.content,
    }))
}
