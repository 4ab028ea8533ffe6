use clipkeep_remote::{CameraConfig, CameraService, ClipHandle, Endpoint, RemoteError};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::data::PollPolicy;
use crate::error::Cause;

/// Generation status of one requested clip.
///
/// ```text
/// Requested ──► Polling ──► Ready
///                  │  ▲
///                  └──┘ (not generated, under the bound)
///                  ├──► TimedOut
///                  └──► Errored
/// ```
#[derive(Debug)]
pub enum PollState {
    Requested,
    Polling { attempts: u32 },
    /// Terminal. The snapshot is generated and carries a download URL.
    Ready(ClipHandle),
    /// Terminal. The attempt bound was reached without generation finishing.
    TimedOut { attempts: u32 },
    /// Terminal.
    Errored(Cause),
}

impl PollState {
    pub fn attempts(&self) -> u32 {
        match self {
            PollState::Requested => 0,
            PollState::Polling { attempts } | PollState::TimedOut { attempts } => *attempts,
            PollState::Ready(_) | PollState::Errored(_) => 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Requested | PollState::Polling { .. })
    }

    /// Fold one status check into the state.
    ///
    /// Each snapshot replaces the previous one; nothing from earlier polls is kept.
    pub fn observe(self, snapshot: Result<ClipHandle, RemoteError>, max_attempts: u32) -> PollState {
        if self.is_terminal() {
            return self;
        }
        let attempts = self.attempts() + 1;

        let handle = match snapshot {
            Ok(handle) => handle,
            Err(err) => return PollState::Errored(Cause::Remote(err)),
        };

        if handle.is_error {
            return PollState::Errored(Cause::Generation { clip: handle.id });
        }
        if handle.is_generated {
            if handle.download_url.is_none() {
                return PollState::Errored(Cause::Remote(RemoteError::rejected(
                    Endpoint::ClipStatus,
                    format!("clip {} is generated but has no download_url", handle.id),
                )));
            }
            return PollState::Ready(handle);
        }
        if attempts >= max_attempts {
            return PollState::TimedOut { attempts };
        }
        PollState::Polling { attempts }
    }
}

/// Waits for a requested clip to finish generating.
#[derive(Debug, Clone, Default)]
pub struct ClipPoller {
    policy: PollPolicy,
}

impl ClipPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self { policy }
    }

    /// Poll until the clip is ready, failed, timed out or `cancel` fires.
    ///
    /// The first check runs immediately; the policy interval is slept between checks.
    pub async fn wait_ready<S: CameraService>(
        &self,
        service: &S,
        config: &CameraConfig,
        requested: &ClipHandle,
        cancel: &CancellationToken,
    ) -> Result<ClipHandle, Cause> {
        let mut state = PollState::Requested;

        loop {
            let snapshot = service.clip_status(config, &requested.id).await;

            state = match state.observe(snapshot, self.policy.max_attempts) {
                PollState::Ready(handle) => {
                    info!(clip = %handle.id, "ready");
                    return Ok(handle);
                }
                PollState::TimedOut { attempts } => return Err(Cause::TimedOut { attempts }),
                PollState::Errored(cause) => return Err(cause),
                polling => {
                    info!(
                        clip = %requested.id,
                        attempts = polling.attempts(),
                        "polling"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(Cause::Cancelled),
                        _ = tokio::time::sleep(self.policy.interval) => {}
                    }
                    polling
                }
            };
        }
    }
}
