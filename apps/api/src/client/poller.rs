//! Status Poller: observes a résumé's status until it is terminal.
//!
//! States: `Idle → Waiting → {Resolved, Failed}`. Each watch runs as one
//! spawned task owned by a [`PollHandle`]; dropping the handle aborts the
//! task, so teardown and supersession release the timer structurally.
//! Every watch is bounded by [`PollConfig::timeout`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ClientError, RoastApiClient};
use crate::models::resume::ResumeStatus;
use crate::models::roast::RoastView;

/// The two queries the poller needs.
#[async_trait]
pub trait StatusSource: Send + Sync + 'static {
    async fn status(&self, resume_id: Uuid) -> Result<ResumeStatus, ClientError>;

    async fn latest_roast(&self, resume_id: Uuid) -> Result<RoastView, ClientError>;
}

#[async_trait]
impl StatusSource for RoastApiClient {
    async fn status(&self, resume_id: Uuid) -> Result<ResumeStatus, ClientError> {
        self.get_status(resume_id).await
    }

    async fn latest_roast(&self, resume_id: Uuid) -> Result<RoastView, ClientError> {
        RoastApiClient::latest_roast(self, resume_id).await
    }
}

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Upper bound on one watch; exceeded means [`PollError::Timeout`].
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PollError {
    #[error("roasting failed")]
    Failed,

    #[error("no result after {0:?}")]
    Timeout(Duration),

    #[error("status check failed: {0}")]
    Transport(String),

    #[error("polling was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Waiting { resume_id: Uuid, polls: u32 },
    Resolved { resume_id: Uuid, roast: RoastView },
    Failed { resume_id: Uuid, error: PollError },
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PollState::Resolved { .. } | PollState::Failed { .. })
    }
}

/// One running watch. Aborts its task when dropped.
pub struct PollHandle {
    resume_id: Uuid,
    task: JoinHandle<()>,
    state: watch::Receiver<PollState>,
}

impl PollHandle {
    pub fn spawn(source: Arc<dyn StatusSource>, resume_id: Uuid, config: PollConfig) -> Self {
        let (tx, rx) = watch::channel(PollState::Waiting { resume_id, polls: 0 });

        let task = tokio::spawn(async move {
            let outcome = tokio::time::timeout(
                config.timeout,
                poll_until_terminal(source.as_ref(), resume_id, config.interval, &tx),
            )
            .await
            .unwrap_or(Err(PollError::Timeout(config.timeout)));

            let terminal = match outcome {
                Ok(roast) => {
                    info!("Roast ready for resume {resume_id}");
                    PollState::Resolved { resume_id, roast }
                }
                Err(error) => {
                    warn!("Polling resume {resume_id} ended: {error}");
                    PollState::Failed { resume_id, error }
                }
            };
            tx.send_replace(terminal);
        });

        Self {
            resume_id,
            task,
            state: rx,
        }
    }

    pub fn resume_id(&self) -> Uuid {
        self.resume_id
    }

    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.clone()
    }

    /// Waits for the terminal state.
    pub async fn finished(&self) -> Result<RoastView, PollError> {
        let mut rx = self.state.clone();
        let state = rx
            .wait_for(PollState::is_terminal)
            .await
            .map_err(|_| PollError::Cancelled)?
            .clone();
        match state {
            PollState::Resolved { roast, .. } => Ok(roast),
            PollState::Failed { error, .. } => Err(error),
            PollState::Idle | PollState::Waiting { .. } => Err(PollError::Cancelled),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn poll_until_terminal(
    source: &dyn StatusSource,
    resume_id: Uuid,
    interval: Duration,
    tx: &watch::Sender<PollState>,
) -> Result<RoastView, PollError> {
    // `interval` panics on a zero period.
    let mut ticker = tokio::time::interval(interval.max(MIN_POLL_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut polls = 0u32;

    loop {
        ticker.tick().await;
        polls += 1;

        let status = source.status(resume_id).await.map_err(|e| match e {
            ClientError::NotFound(_) => PollError::Failed,
            other => PollError::Transport(other.to_string()),
        })?;
        debug!("poll #{polls} for resume {resume_id}: {status}");

        match status {
            // Status alone carries no content; fetch the roast once.
            ResumeStatus::Completed => {
                return source
                    .latest_roast(resume_id)
                    .await
                    .map_err(|e| PollError::Transport(e.to_string()));
            }
            ResumeStatus::Error => return Err(PollError::Failed),
            ResumeStatus::Uploaded | ResumeStatus::Processing => {
                tx.send_replace(PollState::Waiting { resume_id, polls });
            }
        }
    }
}

/// Owner of at most one active watch, e.g. one per UI view.
///
/// Watching a new résumé supersedes (and stops) the previous one; dropping
/// the poller stops everything.
pub struct StatusPoller {
    source: Arc<dyn StatusSource>,
    config: PollConfig,
    active: Option<PollHandle>,
}

impl StatusPoller {
    pub fn new(source: Arc<dyn StatusSource>, config: PollConfig) -> Self {
        Self {
            source,
            config,
            active: None,
        }
    }

    /// Starts watching `resume_id`. Re-watching the active id is a no-op
    /// while its poll is still running; a finished poll is started afresh.
    pub fn watch(&mut self, resume_id: Uuid) -> &PollHandle {
        let handle = match self.active.take() {
            Some(handle) if handle.resume_id() == resume_id && !handle.state().is_terminal() => {
                handle
            }
            previous => {
                if let Some(previous) = previous {
                    debug!(
                        "Resume {} superseded by {resume_id}; stopping its poll",
                        previous.resume_id()
                    );
                }
                PollHandle::spawn(self.source.clone(), resume_id, self.config)
            }
        };
        self.active.insert(handle)
    }

    pub fn stop(&mut self) {
        self.active = None;
    }

    pub fn state(&self) -> PollState {
        self.active
            .as_ref()
            .map(PollHandle::state)
            .unwrap_or(PollState::Idle)
    }

    pub fn active(&self) -> Option<&PollHandle> {
        self.active.as_ref()
    }

    /// Waits for the active watch to finish.
    pub async fn wait(&self) -> Result<RoastView, PollError> {
        match &self.active {
            Some(handle) => handle.finished().await,
            None => Err(PollError::Cancelled),
        }
    }
}
