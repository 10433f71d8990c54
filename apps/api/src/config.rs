use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::LlmProvider;

pub const DEFAULT_EXTRACTOR_URL: &str = "https://pdf-to-text.deno.dev/extract";

/// Which text extraction contract the pipeline talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorBackend {
    /// External HTTP extraction service.
    Remote,
    /// In-process `pdf-extract`.
    Local,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub extractor_backend: ExtractorBackend,
    pub extractor_url: String,
    pub llm_provider: LlmProvider,
    /// No key means the generator runs in fallback mode only.
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub http_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };

        let extractor_backend = match lookup("EXTRACTOR_BACKEND").as_deref() {
            None | Some("remote") => ExtractorBackend::Remote,
            Some("local") => ExtractorBackend::Local,
            Some(other) => bail!("EXTRACTOR_BACKEND must be 'remote' or 'local', got '{other}'"),
        };

        let llm_provider = match lookup("LLM_PROVIDER") {
            Some(raw) => raw.parse::<LlmProvider>()?,
            None => LlmProvider::DeepSeek,
        };
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let llm_api_key =
            non_blank("LLM_API_KEY").or_else(|| non_blank(llm_provider.api_key_var()));

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            s3_bucket: require("S3_BUCKET")?,
            s3_endpoint: require("S3_ENDPOINT")?,
            s3_region: lookup("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            aws_access_key_id: require("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            extractor_backend,
            extractor_url: lookup("EXTRACTOR_URL")
                .unwrap_or_else(|| DEFAULT_EXTRACTOR_URL.to_string()),
            llm_provider,
            llm_api_key,
            llm_model: lookup("LLM_MODEL"),
            http_timeout: Duration::from_secs(
                lookup("HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|| "60".to_string())
                    .parse::<u64>()
                    .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn base_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgres://localhost/roaster"),
            ("S3_BUCKET", "resumes"),
            ("S3_ENDPOINT", "http://localhost:9000"),
            ("AWS_ACCESS_KEY_ID", "minio"),
            ("AWS_SECRET_ACCESS_KEY", "minio123"),
        ])
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<Config> {
        Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&base_vars()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.extractor_backend, ExtractorBackend::Remote);
        assert_eq!(config.extractor_url, DEFAULT_EXTRACTOR_URL);
        assert_eq!(config.llm_provider, LlmProvider::DeepSeek);
        assert!(config.llm_api_key.is_none());
        assert_eq!(config.http_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_missing_required_var_names_it() {
        let mut vars = base_vars();
        vars.remove("S3_BUCKET");
        let err = load(&vars).unwrap_err();
        assert!(err.to_string().contains("S3_BUCKET"));
    }

    #[test]
    fn test_provider_specific_key_is_picked_up() {
        let mut vars = base_vars();
        vars.insert("LLM_PROVIDER", "openai");
        vars.insert("OPENAI_API_KEY", "sk-test");
        vars.insert("DEEPSEEK_API_KEY", "ds-test");
        let config = load(&vars).unwrap();
        assert_eq!(config.llm_provider, LlmProvider::OpenAi);
        assert_eq!(config.llm_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_blank_key_means_unconfigured() {
        let mut vars = base_vars();
        vars.insert("DEEPSEEK_API_KEY", "   ");
        assert!(load(&vars).unwrap().llm_api_key.is_none());
    }

    #[test]
    fn test_blank_generic_key_falls_through_to_provider_key() {
        let mut vars = base_vars();
        vars.insert("LLM_API_KEY", "");
        vars.insert("DEEPSEEK_API_KEY", "ds-test");
        let config = load(&vars).unwrap();
        assert_eq!(config.llm_api_key.as_deref(), Some("ds-test"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut vars = base_vars();
        vars.insert("EXTRACTOR_BACKEND", "ocr");
        assert!(load(&vars).is_err());

        let mut vars = base_vars();
        vars.insert("PORT", "eighty");
        assert!(load(&vars).is_err());

        let mut vars = base_vars();
        vars.insert("LLM_PROVIDER", "carrier-pigeon");
        assert!(load(&vars).is_err());
    }
}
