//! Shared fixtures for unit tests: in-memory state and scripted extractors.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::extraction::{ExtractionError, TextExtractor};
use crate::models::resume::{ResumeRow, ResumeStatus};
use crate::roast::RoastGenerator;
use crate::state::AppState;
use crate::storage::memory::MemoryStorage;
use crate::storage::ObjectStorage;
use crate::store::memory::MemoryStore;
use crate::store::ResumeStore;
use crate::upload::{object_key, PDF_CONTENT_TYPE};

pub struct FixedExtractor {
    answer: Option<String>,
    pub calls: AtomicUsize,
}

impl FixedExtractor {
    pub fn text(text: &str) -> Self {
        Self {
            answer: Some(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TextExtractor for FixedExtractor {
    async fn extract(&self, _pdf: &[u8]) -> Result<String, ExtractionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().ok_or(ExtractionError::Service {
            status: 502,
            reason: "Bad Gateway".to_string(),
        })
    }
}

pub struct Harness {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub storage: Arc<MemoryStorage>,
    pub extractor: Arc<FixedExtractor>,
}

impl Harness {
    pub fn new(extractor: FixedExtractor, generator: RoastGenerator) -> Self {
        let store = Arc::new(MemoryStore::default());
        let storage = Arc::new(MemoryStorage::default());
        let extractor = Arc::new(extractor);
        let state = AppState {
            store: store.clone(),
            storage: storage.clone(),
            extractor: extractor.clone(),
            generator,
        };
        Self {
            state,
            store,
            storage,
            extractor,
        }
    }

    /// Stores a fake PDF of `size` bytes and records an `uploaded` résumé for it.
    pub async fn upload_pdf(&self, size: usize) -> ResumeRow {
        let key = object_key();
        let mut bytes = b"%PDF-1.4\n".to_vec();
        bytes.resize(size.max(bytes.len()), b' ');
        self.storage
            .put_object(&key, bytes.into(), PDF_CONTENT_TYPE)
            .await
            .unwrap();
        let resume = ResumeRow::uploaded(key);
        self.store.insert_resume(&resume).await.unwrap();
        resume
    }
}

/// Panics unless every step in `history` is a legal forward transition.
pub fn assert_monotonic(history: &[ResumeStatus]) {
    for pair in history.windows(2) {
        assert!(
            pair[0].can_transition_to(pair[1]),
            "illegal transition {} -> {} in {history:?}",
            pair[0],
            pair[1]
        );
    }
}
