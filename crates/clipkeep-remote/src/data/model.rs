use std::fmt;

use chrono::TimeZone;
use thiserror::Error;

use crate::core::clip_title;
use crate::error::{Endpoint, RemoteError};

/// A contiguous recorded interval reported by the listing endpoint.
///
/// Fields are private so the `end >= start` invariant holds for every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedSegment {
    start: i64,
    end: i64,
    has_video: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("segment ends ({end}) before it starts ({start})")]
pub struct InvalidSegment {
    pub start: i64,
    pub end: i64,
}

impl RecordedSegment {
    pub fn new(start: i64, end: i64, has_video: bool) -> Result<Self, InvalidSegment> {
        if end < start {
            return Err(InvalidSegment { start, end });
        }
        Ok(Self {
            start,
            end,
            has_video,
        })
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    pub fn has_video(&self) -> bool {
        self.has_video
    }

    /// Length in seconds; never negative.
    pub fn duration(&self) -> u64 {
        self.end.abs_diff(self.start)
    }
}

impl fmt::Display for RecordedSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{}]", self.start, self.end)
    }
}

/// Parameters for materialising one segment as a durable clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipRequest {
    pub start_time: i64,
    pub duration_seconds: u64,
    /// Sortable timestamp of `start_time`; also the local filename stem.
    pub title: String,
}

impl ClipRequest {
    /// Derive the request for `segment`, titling it in the given time zone.
    pub fn for_segment<Tz: TimeZone>(segment: &RecordedSegment, tz: &Tz) -> Result<Self, RemoteError>
    where
        Tz::Offset: fmt::Display,
    {
        let title = clip_title(segment.start(), tz).ok_or_else(|| {
            RemoteError::rejected(
                Endpoint::CreateClip,
                format!("start time {} is out of range", segment.start()),
            )
        })?;

        Ok(Self {
            start_time: segment.start(),
            duration_seconds: segment.duration(),
            title,
        })
    }
}

/// Remote clip identifier. The service reports it as a number; it is kept
/// as text so it round-trips verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClipId(pub String);

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClipId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Snapshot of a remote clip record.
///
/// Every status query yields a fresh snapshot that replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipHandle {
    pub id: ClipId,
    pub title: String,
    pub is_generated: bool,
    /// Set when the service reports that generation failed.
    pub is_error: bool,
    pub download_url: Option<String>,
}
