//! Clip lifecycle pipeline.
//!
//! Each recorded segment is driven through five stages, one segment at a time:
//!
//! ```text
//! list ──► request ──► poll ──► download ──► delete
//! ```
//!
//! The remote clip is deleted only after the local file is confirmed written.
//! A failure in any stage after listing is scoped to its segment; the run
//! always reaches a [`RunSummary`].

mod data;
mod error;
mod pipeline;
mod poller;

pub use data::{Archived, Outcome, PollPolicy, Removal, RunSummary, SegmentReport, SkipReason};
pub use error::{Cause, PipelineError, Stage, StageError};
pub use pipeline::Pipeline;
pub use poller::{ClipPoller, PollState};
