use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{ResumeStore, StoreError};
use crate::models::resume::{ResumeRow, ResumeStatus};
use crate::models::roast::RoastRow;

/// PostgreSQL-backed record store.
#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn insert_resume(&self, resume: &ResumeRow) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO resumes (id, file_path, content, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(resume.id)
        .bind(&resume.file_path)
        .bind(&resume.content)
        .bind(resume.status.as_str())
        .bind(resume.created_at)
        .bind(resume.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_resume(&self, id: Uuid) -> Result<Option<ResumeRow>, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn transition_status(&self, id: Uuid, to: ResumeStatus) -> Result<bool, StoreError> {
        // Conditional UPDATE keeps the lifecycle monotonic under concurrent writers.
        let from: Vec<String> = to
            .predecessors()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        let result = sqlx::query(
            "UPDATE resumes SET status = $1, updated_at = now() WHERE id = $2 AND status = ANY($3)",
        )
        .bind(to.as_str())
        .bind(id)
        .bind(&from)
        .execute(&self.pool)
        .await?;

        let applied = result.rows_affected() == 1;
        debug!("status transition {id} -> {to}: applied={applied}");
        Ok(applied)
    }

    async fn set_content(&self, id: Uuid, content: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE resumes SET content = $1, updated_at = now()
            WHERE id = $2 AND status NOT IN ('completed', 'error')
            "#,
        )
        .bind(content)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_roast(&self, roast: &RoastRow) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO roasts (id, resume_id, share_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(roast.id)
        .bind(roast.resume_id)
        .bind(roast.share_id)
        .bind(&roast.content)
        .bind(roast.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_roast(&self, id: Uuid) -> Result<Option<RoastRow>, StoreError> {
        let row = sqlx::query_as::<_, RoastRow>("SELECT * FROM roasts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_roast_by_share_id(&self, share_id: Uuid) -> Result<Option<RoastRow>, StoreError> {
        let row = sqlx::query_as::<_, RoastRow>("SELECT * FROM roasts WHERE share_id = $1")
            .bind(share_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn latest_roast_for_resume(
        &self,
        resume_id: Uuid,
    ) -> Result<Option<RoastRow>, StoreError> {
        let row = sqlx::query_as::<_, RoastRow>(
            "SELECT * FROM roasts WHERE resume_id = $1 ORDER BY created_at DESC, id LIMIT 1",
        )
        .bind(resume_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
