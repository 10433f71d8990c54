use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{text_or_placeholder, ExtractionError, TextExtractor};

#[derive(Serialize)]
struct ExtractRequest {
    /// Base64-encoded PDF.
    pdf: String,
}

#[derive(Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    text: Option<String>,
}

/// Adapter for the external PDF-to-text service.
#[derive(Clone)]
pub struct RemoteTextExtractor {
    client: Client,
    url: String,
}

impl RemoteTextExtractor {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            url: url.into(),
        }
    }
}

#[async_trait]
impl TextExtractor for RemoteTextExtractor {
    async fn extract(&self, pdf: &[u8]) -> Result<String, ExtractionError> {
        let request = ExtractRequest {
            pdf: STANDARD.encode(pdf),
        };

        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::Service {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let body: ExtractResponse = response.json().await?;
        debug!(
            "extracted {} chars from {} byte PDF",
            body.text.as_deref().map_or(0, str::len),
            pdf.len()
        );
        Ok(text_or_placeholder(body.text))
    }
}
