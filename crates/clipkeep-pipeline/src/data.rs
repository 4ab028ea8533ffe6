use std::path::PathBuf;
use std::time::Duration;

use clipkeep_remote::{ClipId, RecordedSegment, RemoteError};

use crate::error::StageError;

/// Bound and pacing of status polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause between two status checks. Rate-limits the remote service.
    ///
    /// Default: 10s
    pub interval: Duration,

    /// Status checks allowed before giving up with `TimedOut`.
    ///
    /// Default: 90 (15 minutes at the default interval)
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 90,
        }
    }
}

impl PollPolicy {
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

/// What happened to the remote clip after its local copy was saved.
#[derive(Debug)]
pub enum Removal {
    /// Deleted; carries the service's status description.
    Deleted(String),
    /// Deletion failed and the remote clip still exists.
    Leaked(RemoteError),
}

#[derive(Debug)]
pub struct Archived {
    pub clip: ClipId,
    pub path: PathBuf,
    pub bytes: u64,
    pub removal: Removal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoVideo,
}

#[derive(Debug)]
pub enum Outcome {
    Archived(Archived),
    Skipped(SkipReason),
    Failed(StageError),
}

#[derive(Debug)]
pub struct SegmentReport {
    pub segment: RecordedSegment,
    pub outcome: Outcome,
}

/// Per-segment results of one run, in processing order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<SegmentReport>,
    /// Set when the run stopped on a cancellation request.
    pub cancelled: bool,
    /// Listed segments never started because the run was cancelled.
    pub unprocessed: usize,
}

impl RunSummary {
    pub fn archived(&self) -> impl Iterator<Item = (&RecordedSegment, &Archived)> {
        self.reports.iter().filter_map(|r| match &r.outcome {
            Outcome::Archived(archived) => Some((&r.segment, archived)),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&RecordedSegment, &StageError)> {
        self.reports.iter().filter_map(|r| match &r.outcome {
            Outcome::Failed(err) => Some((&r.segment, err)),
            _ => None,
        })
    }

    pub fn skipped(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Skipped(_)))
            .count()
    }

    /// Archived clips whose remote copy could not be deleted.
    pub fn leaked(&self) -> usize {
        self.archived()
            .filter(|(_, a)| matches!(a.removal, Removal::Leaked(_)))
            .count()
    }

    pub fn processed(&self) -> usize {
        self.reports.len()
    }

    /// No segment failed and the run was not cut short.
    pub fn is_clean(&self) -> bool {
        !self.cancelled && self.failures().next().is_none()
    }
}
