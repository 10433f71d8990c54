//! Roast pipeline orchestrator.
//!
//! Flow: fetch résumé → mark processing → extract text if missing →
//!       generate roast → insert roast → mark completed (or error).
//!
//! Upstream AI failures degrade (placeholder text, fallback roast) and are
//! reported in `RoastOutcome::degradations`. Store failures on the roast
//! insert are fatal. Runs are not deduplicated: concurrent or repeated calls
//! for one résumé each insert their own roast.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::resume::{ResumeRow, ResumeStatus};
use crate::models::roast::RoastRow;
use crate::state::AppState;
use crate::store::StoreError;

/// Stored and roasted in place of text when extraction fails.
pub const EXTRACTION_FALLBACK_CONTENT: &str =
    "Failed to extract text from PDF. Using fallback content for demonstration.";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("resume {0} not found")]
    NotFound(Uuid),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

/// An upstream failure absorbed by a fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Degradation {
    ExtractionFallback { reason: String },
    GenerationFallback { reason: String },
}

#[derive(Debug)]
pub struct RoastOutcome {
    pub roast: RoastRow,
    /// Empty when every upstream call succeeded.
    pub degradations: Vec<Degradation>,
}

impl RoastOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}

/// Runs the full pipeline for one résumé.
///
/// Status writes are best-effort except that a failed roast insert marks the
/// résumé `error`. Writes that would move a terminal résumé backwards are
/// refused by the store and only logged.
pub async fn process_roast(state: &AppState, resume_id: Uuid) -> Result<RoastOutcome, PipelineError> {
    // Step 1: Fetch
    let resume = state
        .store
        .get_resume(resume_id)
        .await?
        .ok_or(PipelineError::NotFound(resume_id))?;

    // Step 2: Mark processing
    advance(state, &resume, ResumeStatus::Processing).await;

    let mut degradations = Vec::new();

    // Step 3: Extract if needed
    let content = if resume.needs_extraction() {
        let text = match extract_text(state, &resume).await {
            Ok(text) => text,
            Err(reason) => {
                warn!("Extraction failed for resume {resume_id}: {reason} - using placeholder");
                degradations.push(Degradation::ExtractionFallback { reason });
                EXTRACTION_FALLBACK_CONTENT.to_string()
            }
        };
        match state.store.set_content(resume_id, &text).await {
            Ok(true) => {}
            Ok(false) => warn!("Content for resume {resume_id} not stored: resume is terminal"),
            Err(e) => warn!("Failed to store content for resume {resume_id}: {e}"),
        }
        text
    } else {
        resume.content.clone().unwrap_or_default()
    };

    // Step 4: Generate
    let generated = state.generator.generate(&content).await;
    if let Some(reason) = &generated.fallback {
        degradations.push(Degradation::GenerationFallback {
            reason: reason.to_string(),
        });
    }

    // Step 5: Persist roast
    let roast = RoastRow::new(resume_id, generated.content);
    if let Err(e) = state.store.insert_roast(&roast).await {
        error!("Failed to insert roast for resume {resume_id}: {e}");
        advance(state, &resume, ResumeStatus::Error).await;
        return Err(PipelineError::Persistence(e));
    }

    // Step 6: Complete
    advance(state, &resume, ResumeStatus::Completed).await;

    info!(
        "Roast {} (share {}) created for resume {resume_id}, degraded={}",
        roast.id,
        roast.share_id,
        !degradations.is_empty()
    );

    Ok(RoastOutcome {
        roast,
        degradations,
    })
}

async fn extract_text(state: &AppState, resume: &ResumeRow) -> Result<String, String> {
    let pdf = state
        .storage
        .get_object(&resume.file_path)
        .await
        .map_err(|e| format!("download failed: {e:#}"))?;
    state
        .extractor
        .extract(&pdf)
        .await
        .map_err(|e| e.to_string())
}

/// Best-effort status write; failures and refusals are logged, never raised.
async fn advance(state: &AppState, resume: &ResumeRow, to: ResumeStatus) {
    match state.store.transition_status(resume.id, to).await {
        Ok(true) => info!("Resume {} -> {to}", resume.id),
        Ok(false) => warn!(
            "Resume {} not moved to {to} (was {} when fetched)",
            resume.id, resume.status
        ),
        Err(e) => warn!("Failed to set resume {} to {to}: {e}", resume.id),
    }
}
