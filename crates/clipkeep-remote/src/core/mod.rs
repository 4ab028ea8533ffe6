//! Pure transformations shared by the client and the pipeline.

mod retry;
mod title;

pub use retry::retry_delay;
pub use title::{TITLE_FORMAT, clip_title};
