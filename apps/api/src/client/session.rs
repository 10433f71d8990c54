//! One roast run as seen by a client: request the roast and watch its status
//! at the same time, reporting whichever settles first.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use super::poller::{PollConfig, PollError, StatusPoller};
use super::{ClientError, RoastApiClient, RoastReply};

/// How long to wait for the roast request after the poll has given up.
const REQUEST_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RoastRunError {
    /// The roast request itself failed; carries the server's reason.
    #[error(transparent)]
    Request(#[from] ClientError),

    #[error(transparent)]
    Poll(#[from] PollError),
}

impl RoastRunError {
    /// True when the server failed and asking again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            RoastRunError::Request(ClientError::Api { status, .. }) => *status >= 500,
            RoastRunError::Request(ClientError::Http(_)) => true,
            RoastRunError::Poll(PollError::Timeout(_) | PollError::Transport(_)) => true,
            _ => false,
        }
    }
}

/// Requests a roast for `resume_id` while polling its status.
///
/// A failed request is reported as soon as it arrives, without waiting out
/// the poll timeout. When the poll settles first with a failure, the request
/// gets [`REQUEST_GRACE`] to deliver the underlying reason.
pub async fn run_roast(
    client: Arc<RoastApiClient>,
    resume_id: Uuid,
    poll: PollConfig,
) -> Result<RoastReply, RoastRunError> {
    let mut poller = StatusPoller::new(client.clone(), poll);
    poller.watch(resume_id);

    let request = client.request_roast(resume_id);
    tokio::pin!(request);

    tokio::select! {
        reply = &mut request => Ok(reply?),
        polled = poller.wait() => match polled {
            Ok(roast) => Ok(RoastReply {
                roast,
                degraded: Vec::new(),
            }),
            Err(poll_error) => match tokio::time::timeout(REQUEST_GRACE, &mut request).await {
                Ok(reply) => Ok(reply?),
                Err(_) => Err(poll_error.into()),
            },
        },
    }
}
