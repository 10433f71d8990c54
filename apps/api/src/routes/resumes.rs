//! Axum route handlers for résumé upload and status.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumeRow, ResumeStatus};
use crate::models::roast::RoastView;
use crate::routes::parse_id;
use crate::state::AppState;
use crate::upload::{object_key, validate_upload, PDF_CONTENT_TYPE};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeStatusResponse {
    pub resume_id: Uuid,
    pub status: ResumeStatus,
}

/// POST /api/v1/resumes
///
/// Multipart upload with a single `file` field. The PDF is validated, stored,
/// and recorded with status `uploaded`.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeStatusResponse>), AppError> {
    let mut upload: Option<(Option<String>, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|err| {
        error!("invalid multipart data: {err}");
        AppError::Validation(format!("invalid multipart data: {err}"))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|err| {
            error!("failed to read file bytes: {err}");
            AppError::Validation(format!("failed to read file: {err}"))
        })?;
        upload = Some((content_type, data));
    }

    let (content_type, bytes) =
        upload.ok_or_else(|| AppError::Validation("file field is required".to_string()))?;

    validate_upload(content_type.as_deref(), bytes.len()).map_err(|rejection| {
        info!("upload rejected: {rejection}");
        AppError::from(rejection)
    })?;

    let key = object_key();
    let size = bytes.len();
    state
        .storage
        .put_object(&key, bytes, PDF_CONTENT_TYPE)
        .await
        .map_err(|e| AppError::Storage(format!("{e:#}")))?;

    let resume = ResumeRow::uploaded(key);
    state.store.insert_resume(&resume).await?;

    info!("Resume {} uploaded ({size} bytes) to {}", resume.id, resume.file_path);

    Ok((
        StatusCode::CREATED,
        Json(ResumeStatusResponse {
            resume_id: resume.id,
            status: resume.status,
        }),
    ))
}

/// GET /api/v1/resumes/:id/status
pub async fn handle_get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResumeStatusResponse>, AppError> {
    let resume_id = parse_id(&id, "Resume")?;
    let resume = state
        .store
        .get_resume(resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    Ok(Json(ResumeStatusResponse {
        resume_id,
        status: resume.status,
    }))
}

/// GET /api/v1/resumes/:id/roast
///
/// Latest roast for the résumé; what a poller fetches once status is `completed`.
pub async fn handle_get_latest_roast(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoastView>, AppError> {
    let resume_id = parse_id(&id, "Resume")?;
    let roast = state
        .store
        .latest_roast_for_resume(resume_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Roast not found".to_string()))?;

    Ok(Json(RoastView::from(roast)))
}
