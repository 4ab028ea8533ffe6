use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::progress::Progress;

/// Where and how clips are written.
///
/// # Examples
///
/// ```
/// use clipkeep_fetch::DownloadOptions;
///
/// let options = DownloadOptions::default()
///     .output_dir("/srv/camera")
///     .on_progress(|p| println!("{} {}", p.phase, p.bytes_downloaded));
/// ```
#[derive(Clone)]
pub struct DownloadOptions {
    /// Directory receiving `<title>.<extension>` files.
    ///
    /// Default: the current working directory
    pub output_dir: PathBuf,

    /// Media extension appended to the clip title.
    ///
    /// Default: `mp4`
    pub extension: String,

    /// Invoked on phase transitions and after each chunk write.
    ///
    /// Default: None
    pub on_progress: Option<Arc<dyn Fn(&Progress) + Send + Sync>>,
}

impl fmt::Debug for DownloadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadOptions")
            .field("output_dir", &self.output_dir)
            .field("extension", &self.extension)
            .field("on_progress", &"{ ... }")
            .finish()
    }
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            extension: "mp4".to_string(),
            on_progress: None,
        }
    }
}

impl DownloadOptions {
    #[must_use]
    pub fn output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    #[must_use]
    pub fn on_progress(mut self, callback: impl Fn(&Progress) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(callback));
        self
    }
}
