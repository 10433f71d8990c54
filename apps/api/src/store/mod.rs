//! Record store: the narrow interface to the `resumes` and `roasts` tables.
//!
//! `AppState` carries an `Arc<dyn ResumeStore>`; production uses
//! [`PgResumeStore`], tests use the in-memory store.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::resume::{ResumeRow, ResumeStatus};
use crate::models::roast::RoastRow;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgResumeStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ResumeStore: Send + Sync + 'static {
    async fn insert_resume(&self, resume: &ResumeRow) -> Result<(), StoreError>;

    async fn get_resume(&self, id: Uuid) -> Result<Option<ResumeRow>, StoreError>;

    /// Moves the résumé to `to` only if its current status is a legal predecessor.
    /// Returns whether the write was applied; a rejected transition is not an error.
    async fn transition_status(&self, id: Uuid, to: ResumeStatus) -> Result<bool, StoreError>;

    /// Stores extracted text. Refused (returns `false`) once the résumé is terminal.
    async fn set_content(&self, id: Uuid, content: &str) -> Result<bool, StoreError>;

    async fn insert_roast(&self, roast: &RoastRow) -> Result<(), StoreError>;

    async fn get_roast(&self, id: Uuid) -> Result<Option<RoastRow>, StoreError>;

    async fn get_roast_by_share_id(&self, share_id: Uuid) -> Result<Option<RoastRow>, StoreError>;

    async fn latest_roast_for_resume(&self, resume_id: Uuid)
        -> Result<Option<RoastRow>, StoreError>;
}
