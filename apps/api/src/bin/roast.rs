use std::env;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use roaster::client::{run_roast, ClientConfig, ClientError, PollError, RoastApiClient, RoastRunError};
use roaster::upload::PDF_CONTENT_TYPE;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roaster=warn")),
        )
        .init();

    let mut args = env::args().skip(1);
    let path = match (args.next(), args.next()) {
        (Some(path), None) => path,
        _ => {
            eprintln!("Usage: roast <resume.pdf>");
            std::process::exit(1);
        }
    };

    let config = ClientConfig::from_env()?;
    let client = Arc::new(RoastApiClient::new(config.base_url.clone()));

    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("failed to read {path}"))?;
    let file_name = Path::new(&path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("resume.pdf");

    let resume_id = match client.upload_resume(file_name, PDF_CONTENT_TYPE, bytes).await {
        Ok(id) => id,
        Err(ClientError::Rejected(reason)) => {
            eprintln!("Upload rejected: {reason}");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    println!("Uploaded resume {resume_id}; roasting…");

    match run_roast(client, resume_id, config.poll).await {
        Ok(reply) => {
            for degradation in &reply.degraded {
                tracing::warn!("degraded: {degradation:?}");
            }
            println!("\n{}\n", reply.roast.content);
            println!("Share: {}/share/{}", config.base_url, reply.roast.share_id);
            Ok(())
        }
        Err(e) => {
            match &e {
                RoastRunError::Poll(PollError::Timeout(after)) => {
                    eprintln!("No roast after {after:?}.")
                }
                RoastRunError::Request(ClientError::NotFound(_)) => eprintln!("Resume not found."),
                other => eprintln!("Roasting failed: {other}"),
            }
            if e.is_retryable() {
                eprintln!("Please try again.");
            }
            std::process::exit(1);
        }
    }
}
