//! Text extraction: PDF bytes in, plain text out.
//!
//! Two interchangeable contracts behind [`TextExtractor`]: the external HTTP
//! service (default) and in-process `pdf-extract`. Neither retries; the
//! pipeline decides what a failure means.

use async_trait::async_trait;
use thiserror::Error;

pub mod local;
pub mod remote;

pub use local::LocalTextExtractor;
pub use remote::RemoteTextExtractor;

/// In-band placeholder the extraction service contract yields when it
/// answers successfully but carries no text.
pub const EMPTY_EXTRACTION_TEXT: &str = "Failed to extract text from PDF.";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("extraction transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("extraction service returned {status}: {reason}")]
    Service { status: u16, reason: String },

    #[error("could not read PDF: {0}")]
    Pdf(String),
}

#[async_trait]
pub trait TextExtractor: Send + Sync + 'static {
    async fn extract(&self, pdf: &[u8]) -> Result<String, ExtractionError>;
}

/// Normalizes extractor output: blank text becomes the in-band placeholder.
pub(crate) fn text_or_placeholder(text: Option<String>) -> String {
    text.filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| EMPTY_EXTRACTION_TEXT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_becomes_placeholder() {
        assert_eq!(text_or_placeholder(None), EMPTY_EXTRACTION_TEXT);
        assert_eq!(text_or_placeholder(Some("  \n".into())), EMPTY_EXTRACTION_TEXT);
        assert_eq!(text_or_placeholder(Some("Ninja".into())), "Ninja");
    }
}
