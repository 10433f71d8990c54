use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A generated roast. Immutable once written; `share_id` is the public handle.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoastRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub share_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl RoastRow {
    /// New roast for `resume_id` with a freshly minted share id.
    pub fn new(resume_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            resume_id,
            share_id: Uuid::new_v4(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Wire shape of a roast returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoastView {
    pub roast_id: Uuid,
    pub share_id: Uuid,
    pub content: String,
}

impl From<RoastRow> for RoastView {
    fn from(row: RoastRow) -> Self {
        Self {
            roast_id: row.id,
            share_id: row.share_id,
            content: row.content,
        }
    }
}
