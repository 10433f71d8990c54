use std::sync::Arc;

use crate::extraction::TextExtractor;
use crate::roast::RoastGenerator;
use crate::storage::ObjectStorage;
use crate::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ResumeStore>,
    pub storage: Arc<dyn ObjectStorage>,
    /// Remote service or local `pdf-extract`, per `EXTRACTOR_BACKEND`.
    pub extractor: Arc<dyn TextExtractor>,
    pub generator: RoastGenerator,
}
