//! HTTP client for the roaster API plus the status poller that tracks a
//! résumé until it reaches a terminal state.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::{multipart, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::resume::ResumeStatus;
use crate::models::roast::RoastView;
use crate::pipeline::Degradation;
use crate::upload::{validate_upload, UploadRejection};

pub mod poller;
pub mod session;

pub use poller::{PollConfig, PollError, PollHandle, PollState, StatusPoller, StatusSource};
pub use session::{run_roast, RoastRunError};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Refused locally; nothing was sent.
    #[error("{0}")]
    Rejected(#[from] UploadRejection),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}, {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
}

/// Client-side settings, from the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub poll: PollConfig,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Zero durations are
    /// rejected: a poll needs a period and a deadline.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = PollConfig::default();
        let interval = match lookup("POLL_INTERVAL_MS") {
            Some(raw) => Duration::from_millis(
                raw.parse()
                    .context("POLL_INTERVAL_MS must be a whole number of milliseconds")?,
            ),
            None => defaults.interval,
        };
        if interval.is_zero() {
            bail!("POLL_INTERVAL_MS must be greater than zero");
        }
        let timeout = match lookup("POLL_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .context("POLL_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => defaults.timeout,
        };
        if timeout.is_zero() {
            bail!("POLL_TIMEOUT_SECS must be greater than zero");
        }
        Ok(Self {
            base_url: lookup("ROAST_API_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            poll: PollConfig { interval, timeout },
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadReply {
    resume_id: Uuid,
}

#[derive(Debug, Deserialize)]
struct StatusReply {
    status: ResumeStatus,
}

#[derive(Debug, Deserialize)]
struct SharedReply {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoastRequestBody {
    resume_id: Uuid,
}

/// Answer to a roast request.
#[derive(Debug, Clone, Deserialize)]
pub struct RoastReply {
    #[serde(flatten)]
    pub roast: RoastView,
    #[serde(default)]
    pub degraded: Vec<Degradation>,
}

#[derive(Clone)]
pub struct RoastApiClient {
    http: Client,
    base_url: String,
}

impl RoastApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Validates locally, then uploads. Returns the new résumé id.
    pub async fn upload_resume(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Uuid, ClientError> {
        validate_upload(Some(content_type), bytes.len())?;

        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("/api/v1/resumes"))
            .multipart(form)
            .send()
            .await?;
        let reply: UploadReply = read_json(response).await?;
        Ok(reply.resume_id)
    }

    /// Runs the roast pipeline and waits for its answer.
    pub async fn request_roast(&self, resume_id: Uuid) -> Result<RoastReply, ClientError> {
        let response = self
            .http
            .post(self.url("/api/v1/roasts"))
            .json(&RoastRequestBody { resume_id })
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn get_status(&self, resume_id: Uuid) -> Result<ResumeStatus, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/v1/resumes/{resume_id}/status")))
            .send()
            .await?;
        let reply: StatusReply = read_json(response).await?;
        Ok(reply.status)
    }

    pub async fn latest_roast(&self, resume_id: Uuid) -> Result<RoastView, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/v1/resumes/{resume_id}/roast")))
            .send()
            .await?;
        read_json(response).await
    }

    /// Shared roast content, or `None` if the share id is unknown.
    pub async fn get_by_share_id(&self, share_id: &str) -> Result<Option<String>, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/v1/share/{share_id}")))
            .send()
            .await?;
        match read_json::<SharedReply>(response).await {
            Ok(reply) => Ok(Some(reply.content)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let (code, message) = serde_json::from_str::<ErrorReply>(&body)
        .map(|e| (e.error.code, e.error.message))
        .unwrap_or_else(|_| ("UNKNOWN".to_string(), body));

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(message));
    }
    Err(ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    })
}
