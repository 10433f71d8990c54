//! Upload validation shared by the HTTP route and the client.

use thiserror::Error;
use uuid::Uuid;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
/// 5 MiB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("Please upload a PDF file: only PDF files are supported (got {0})")]
    NotPdf(String),

    #[error("File too large: maximum file size is 5MB (got {0} bytes)")]
    TooLarge(usize),

    #[error("File is empty")]
    Empty,
}

/// Rejects anything that is not a non-empty PDF of at most [`MAX_UPLOAD_BYTES`].
pub fn validate_upload(content_type: Option<&str>, size: usize) -> Result<(), UploadRejection> {
    match content_type {
        Some(PDF_CONTENT_TYPE) => {}
        Some(other) => return Err(UploadRejection::NotPdf(other.to_string())),
        None => return Err(UploadRejection::NotPdf("no content type".to_string())),
    }
    if size == 0 {
        return Err(UploadRejection::Empty);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge(size));
    }
    Ok(())
}

/// Storage key for a new upload. The random name avoids collisions between uploads.
pub fn object_key() -> String {
    format!("public/{}.pdf", Uuid::new_v4())
}
