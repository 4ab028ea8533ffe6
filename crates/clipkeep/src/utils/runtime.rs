use std::io;

use tokio::runtime::{Builder, Runtime};

/// Segments are processed one at a time, so a single-threaded runtime is enough.
pub fn current_thread() -> io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}
