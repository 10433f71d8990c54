//! Roast Generator: live LLM backend with an unconditional canned fallback.
//!
//! `RoastGenerator` holds at most one `Arc<dyn RoastBackend>`, picked at
//! startup from `LLM_PROVIDER`. Without an API key there is no backend and
//! every roast is the fallback. A failed live attempt is not retried.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::llm_client::{CompletionParams, LlmClient, LlmError};
use crate::roast::prompts::{
    build_user_prompt, FALLBACK_ROAST, ROAST_MAX_TOKENS, ROAST_SYSTEM, ROAST_TEMPERATURE,
};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no LLM backend configured")]
    Unconfigured,

    #[error("LLM backend failed: {0}")]
    Backend(#[from] LlmError),
}

/// One live roast-writing strategy.
#[async_trait]
pub trait RoastBackend: Send + Sync {
    /// Short label for logs, e.g. `deepseek/deepseek-chat`.
    fn name(&self) -> String;

    async fn roast(&self, resume_text: &str) -> Result<String, GenerationError>;
}

/// Chat-completion backend shared by every OpenAI-compatible provider.
pub struct ChatCompletionBackend {
    label: String,
    llm: LlmClient,
}

impl ChatCompletionBackend {
    pub fn new(label: impl Into<String>, llm: LlmClient) -> Self {
        Self {
            label: label.into(),
            llm,
        }
    }
}

#[async_trait]
impl RoastBackend for ChatCompletionBackend {
    fn name(&self) -> String {
        format!("{}/{}", self.label, self.llm.model())
    }

    async fn roast(&self, resume_text: &str) -> Result<String, GenerationError> {
        let text = self
            .llm
            .complete(
                ROAST_SYSTEM,
                &build_user_prompt(resume_text),
                CompletionParams {
                    max_tokens: ROAST_MAX_TOKENS,
                    temperature: ROAST_TEMPERATURE,
                },
            )
            .await?;
        Ok(text)
    }
}

/// Result of a generation: always non-empty content, plus the reason when
/// the fallback stood in for the live backend.
#[derive(Debug)]
pub struct GeneratedRoast {
    pub content: String,
    pub fallback: Option<GenerationError>,
}

impl GeneratedRoast {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[derive(Clone, Default)]
pub struct RoastGenerator {
    backend: Option<Arc<dyn RoastBackend>>,
}

impl RoastGenerator {
    pub fn new(backend: Arc<dyn RoastBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Generator with no live backend; every call yields the fallback.
    pub fn fallback_only() -> Self {
        Self { backend: None }
    }

    pub fn backend_name(&self) -> Option<String> {
        self.backend.as_ref().map(|b| b.name())
    }

    pub async fn generate(&self, resume_text: &str) -> GeneratedRoast {
        let Some(backend) = &self.backend else {
            warn!("No LLM backend configured - using fallback roast");
            return fallback(GenerationError::Unconfigured);
        };

        match backend.roast(resume_text).await {
            Ok(content) if !content.trim().is_empty() => GeneratedRoast {
                content,
                fallback: None,
            },
            Ok(_) => {
                warn!("{} returned an empty roast - using fallback", backend.name());
                fallback(GenerationError::Backend(LlmError::EmptyContent))
            }
            Err(e) => {
                warn!("{} failed: {e} - using fallback roast", backend.name());
                fallback(e)
            }
        }
    }
}

fn fallback(reason: GenerationError) -> GeneratedRoast {
    GeneratedRoast {
        content: FALLBACK_ROAST.to_string(),
        fallback: Some(reason),
    }
}
