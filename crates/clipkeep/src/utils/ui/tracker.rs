use std::sync::{Arc, Mutex, PoisonError};

use clipkeep_fetch::{FetchPhase, Progress};
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

pub trait TrackerBuilder<T: Tracker<U>, U> {
    fn build(self) -> T;
}

pub trait Tracker<Pos> {
    fn update(&self, pos: Pos) -> &Self;
    fn finish(self);
}

const PB_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {wide_msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

pub struct ProgressTracker {
    pb: ProgressBar,
    finish: Option<String>,
}

impl Tracker<&Progress> for ProgressTracker {
    fn update(&self, progress: &Progress) -> &Self {
        if let Some(total) = progress.total_bytes {
            self.pb.set_length(total);
        }
        self.pb.set_position(progress.bytes_downloaded);
        self.pb.set_message(progress.phase.to_string());
        self
    }

    fn finish(self) {
        match self.finish {
            Some(msg) => self.pb.finish_with_message(msg),
            None => self.pb.finish(),
        }
    }
}

impl ProgressTracker {
    /// Stop the bar where it is, marking the transfer as failed.
    pub fn abandon(self) {
        self.pb.abandon_with_message("failed");
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressTrackerBuilder {
    len: Option<u64>,
    prefix: Option<String>,
    finish: Option<String>,
    hidden: bool,
}

impl ProgressTrackerBuilder {
    pub fn with_len(mut self, len: u64) -> Self {
        self.len = Some(len);
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_finish(mut self, finish: &str) -> Self {
        self.finish = Some(finish.to_string());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

impl<'a> TrackerBuilder<ProgressTracker, &'a Progress> for ProgressTrackerBuilder {
    fn build(self) -> ProgressTracker {
        let pb = match (self.hidden, self.len) {
            (true, len) => {
                let pb = ProgressBar::hidden();
                if let Some(len) = len {
                    pb.set_length(len);
                }
                pb
            }
            (false, Some(len)) => ProgressBar::new(len),
            (false, None) => ProgressBar::new_spinner(),
        };
        let pb = if let Some(style) = PB_TEMPLATE.as_ref() {
            pb.with_style(style.clone())
        } else {
            pb
        };

        if let Some(prefix) = self.prefix {
            pb.set_prefix(prefix);
        }
        ProgressTracker {
            pb,
            finish: self.finish,
        }
    }
}

/// Turns download progress callbacks into one progress bar per clip.
#[derive(Clone, Default)]
pub struct DownloadTracker {
    current: Arc<Mutex<Option<ProgressTracker>>>,
    hidden: bool,
}

impl DownloadTracker {
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Default::default()
        }
    }

    /// Callback for `DownloadOptions::on_progress`.
    pub fn observer(&self) -> impl Fn(&Progress) + Send + Sync + 'static {
        let tracker = self.clone();
        move |progress| tracker.observe(progress)
    }

    pub fn observe(&self, progress: &Progress) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        match progress.phase {
            FetchPhase::Connecting => {
                if let Some(stale) = current.take() {
                    stale.finish();
                }
                let mut builder = ProgressTrackerBuilder::default()
                    .with_prefix("Downloading")
                    .with_finish("saved");
                if let Some(total) = progress.total_bytes {
                    builder = builder.with_len(total);
                }
                if self.hidden {
                    builder = builder.hidden();
                }
                let tracker: ProgressTracker = builder.build();
                tracker.update(progress);
                *current = Some(tracker);
            }
            FetchPhase::Downloading => {
                if let Some(tracker) = current.as_ref() {
                    tracker.update(progress);
                }
            }
            FetchPhase::Completed => {
                if let Some(tracker) = current.take() {
                    tracker.update(progress);
                    tracker.finish();
                }
            }
            FetchPhase::Failed => {
                if let Some(tracker) = current.take() {
                    tracker.abandon();
                }
            }
        }
    }

    #[cfg(test)]
    fn in_flight(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
