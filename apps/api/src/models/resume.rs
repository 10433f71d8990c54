use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle of an uploaded résumé.
///
/// Moves forward only: `uploaded → processing → {completed, error}`.
/// Terminal states never transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeStatus {
    Uploaded,
    Processing,
    Completed,
    Error,
}

impl ResumeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeStatus::Uploaded => "uploaded",
            ResumeStatus::Processing => "processing",
            ResumeStatus::Completed => "completed",
            ResumeStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ResumeStatus::Completed | ResumeStatus::Error)
    }

    /// States a résumé may legally be in immediately before entering `self`.
    /// `uploaded` has no predecessor; terminal states are reachable only from `processing`.
    pub fn predecessors(&self) -> &'static [ResumeStatus] {
        match self {
            ResumeStatus::Uploaded => &[],
            ResumeStatus::Processing => &[ResumeStatus::Uploaded],
            ResumeStatus::Completed | ResumeStatus::Error => &[ResumeStatus::Processing],
        }
    }

    pub fn can_transition_to(&self, next: ResumeStatus) -> bool {
        next.predecessors().contains(self)
    }
}

impl fmt::Display for ResumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown resume status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ResumeStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(ResumeStatus::Uploaded),
            "processing" => Ok(ResumeStatus::Processing),
            "completed" => Ok(ResumeStatus::Completed),
            "error" => Ok(ResumeStatus::Error),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for ResumeStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, UnknownStatus> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub file_path: String,
    pub content: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ResumeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRow {
    /// A freshly uploaded résumé pointing at its stored blob.
    pub fn uploaded(file_path: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            file_path: file_path.into(),
            content: None,
            status: ResumeStatus::Uploaded,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when text has not been extracted yet.
    pub fn needs_extraction(&self) -> bool {
        self.content.as_deref().map_or(true, str::is_empty) && !self.file_path.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(ResumeStatus::Uploaded.can_transition_to(ResumeStatus::Processing));
        assert!(ResumeStatus::Processing.can_transition_to(ResumeStatus::Completed));
        assert!(ResumeStatus::Processing.can_transition_to(ResumeStatus::Error));
    }

    #[test]
    fn test_no_transition_skips_processing() {
        assert!(!ResumeStatus::Uploaded.can_transition_to(ResumeStatus::Completed));
        assert!(!ResumeStatus::Uploaded.can_transition_to(ResumeStatus::Error));
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        for terminal in [ResumeStatus::Completed, ResumeStatus::Error] {
            assert!(terminal.is_terminal());
            for next in [
                ResumeStatus::Uploaded,
                ResumeStatus::Processing,
                ResumeStatus::Completed,
                ResumeStatus::Error,
            ] {
                assert!(!terminal.can_transition_to(next), "{terminal} -> {next}");
            }
        }
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&ResumeStatus::Processing).unwrap();
        assert_eq!(json, r#""processing""#);
        let parsed: ResumeStatus = "completed".parse().unwrap();
        assert_eq!(parsed, ResumeStatus::Completed);
        assert!("done".parse::<ResumeStatus>().is_err());
    }

    #[test]
    fn test_status_from_database_string() {
        assert_eq!(
            ResumeStatus::try_from("error".to_string()).unwrap(),
            ResumeStatus::Error
        );
        let err = ResumeStatus::try_from("archived".to_string()).unwrap_err();
        assert!(err.to_string().contains("archived"));
    }

    #[test]
    fn test_needs_extraction_when_content_missing_or_empty() {
        let mut resume = ResumeRow::uploaded("public/a.pdf");
        assert!(resume.needs_extraction());
        resume.content = Some(String::new());
        assert!(resume.needs_extraction());
        resume.content = Some("Experienced ninja rockstar".to_string());
        assert!(!resume.needs_extraction());
    }

    #[test]
    fn test_no_extraction_without_file_path() {
        let resume = ResumeRow::uploaded("");
        assert!(!resume.needs_extraction());
    }
}
