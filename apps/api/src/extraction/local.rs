use async_trait::async_trait;

use super::{text_or_placeholder, ExtractionError, TextExtractor};

/// In-process extraction with `pdf-extract`, run on the blocking pool.
#[derive(Clone, Default)]
pub struct LocalTextExtractor;

#[async_trait]
impl TextExtractor for LocalTextExtractor {
    async fn extract(&self, pdf: &[u8]) -> Result<String, ExtractionError> {
        let bytes = pdf.to_vec();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| ExtractionError::Pdf(format!("extraction task failed: {e}")))?
            .map_err(|e| ExtractionError::Pdf(e.to_string()))?;
        Ok(text_or_placeholder(Some(text)))
    }
}
