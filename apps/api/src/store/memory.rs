//! In-memory record store for tests. Records every status write attempt and
//! can be told to fail roast inserts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{ResumeStore, StoreError};
use crate::models::resume::{ResumeRow, ResumeStatus};
use crate::models::roast::RoastRow;

#[derive(Default)]
pub struct MemoryStore {
    resumes: Mutex<HashMap<Uuid, ResumeRow>>,
    roasts: Mutex<Vec<RoastRow>>,
    status_attempts: Mutex<Vec<(Uuid, ResumeStatus)>>,
    status_history: Mutex<HashMap<Uuid, Vec<ResumeStatus>>>,
    fail_roast_inserts: AtomicBool,
    fail_status_writes: AtomicBool,
}

impl MemoryStore {
    pub fn fail_roast_inserts(&self, fail: bool) {
        self.fail_roast_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_status_writes(&self, fail: bool) {
        self.fail_status_writes.store(fail, Ordering::SeqCst);
    }

    /// Every `transition_status` call, applied or not.
    pub async fn status_attempts(&self) -> Vec<(Uuid, ResumeStatus)> {
        self.status_attempts.lock().await.clone()
    }

    /// Statuses the résumé has actually held, in order.
    pub async fn status_history(&self, id: Uuid) -> Vec<ResumeStatus> {
        self.status_history
            .lock()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn roasts_for(&self, resume_id: Uuid) -> Vec<RoastRow> {
        self.roasts
            .lock()
            .await
            .iter()
            .filter(|r| r.resume_id == resume_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ResumeStore for MemoryStore {
    async fn insert_resume(&self, resume: &ResumeRow) -> Result<(), StoreError> {
        self.resumes.lock().await.insert(resume.id, resume.clone());
        self.status_history
            .lock()
            .await
            .insert(resume.id, vec![resume.status]);
        Ok(())
    }

    async fn get_resume(&self, id: Uuid) -> Result<Option<ResumeRow>, StoreError> {
        Ok(self.resumes.lock().await.get(&id).cloned())
    }

    async fn transition_status(&self, id: Uuid, to: ResumeStatus) -> Result<bool, StoreError> {
        self.status_attempts.lock().await.push((id, to));
        if self.fail_status_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("status write refused".to_string()));
        }

        let mut resumes = self.resumes.lock().await;
        let Some(resume) = resumes.get_mut(&id) else {
            return Ok(false);
        };
        if !resume.status.can_transition_to(to) {
            return Ok(false);
        }
        resume.status = to;
        resume.updated_at = chrono::Utc::now();
        self.status_history
            .lock()
            .await
            .entry(id)
            .or_default()
            .push(to);
        Ok(true)
    }

    async fn set_content(&self, id: Uuid, content: &str) -> Result<bool, StoreError> {
        let mut resumes = self.resumes.lock().await;
        match resumes.get_mut(&id) {
            Some(resume) if !resume.status.is_terminal() => {
                resume.content = Some(content.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn insert_roast(&self, roast: &RoastRow) -> Result<(), StoreError> {
        if self.fail_roast_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("roast insert refused".to_string()));
        }
        self.roasts.lock().await.push(roast.clone());
        Ok(())
    }

    async fn get_roast(&self, id: Uuid) -> Result<Option<RoastRow>, StoreError> {
        Ok(self.roasts.lock().await.iter().find(|r| r.id == id).cloned())
    }

    async fn get_roast_by_share_id(&self, share_id: Uuid) -> Result<Option<RoastRow>, StoreError> {
        Ok(self
            .roasts
            .lock()
            .await
            .iter()
            .find(|r| r.share_id == share_id)
            .cloned())
    }

    async fn latest_roast_for_resume(
        &self,
        resume_id: Uuid,
    ) -> Result<Option<RoastRow>, StoreError> {
        // Insertion order stands in for created_at.
        Ok(self
            .roasts
            .lock()
            .await
            .iter()
            .rev()
            .find(|r| r.resume_id == resume_id)
            .cloned())
    }
}
