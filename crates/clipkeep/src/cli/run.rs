use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use clipkeep_fetch::{ClipDownloader, ReqwestClient};
use clipkeep_pipeline::Pipeline;
use clipkeep_remote::{NestService, Retrying};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::cli::app::Overrides;
use crate::config::Settings;
use crate::utils::runtime;
use crate::utils::ui::table::{Formatter, ReportRow};
use crate::utils::ui::tracker::DownloadTracker;

/// Conventional exit status for a process ended by SIGINT.
const INTERRUPTED: i32 = 130;

#[derive(Args, Clone, Debug)]
pub struct RunArg {
    #[command(flatten)]
    pub overrides: Overrides,
}

impl RunArg {
    pub fn run(self, config_path: &Path) -> Result<ExitCode> {
        let settings = Settings::load(config_path, &self.overrides)?;
        debug!(?settings, "configuration loaded");

        let camera = settings.camera_config();
        let tracker = DownloadTracker::default();
        let options = settings.download_options().on_progress(tracker.observer());

        let service = Retrying::new(
            NestService::new().context("failed to build HTTP client")?,
            settings.retry_policy(),
        );
        let downloader = ClipDownloader::new(
            ReqwestClient::new().context("failed to build download client")?,
        )
        .with_options(options);
        let cancel = CancellationToken::new();
        let pipeline = Pipeline::new(service, downloader)
            .with_poll_policy(settings.poll_policy())
            .with_cancellation(cancel.clone());

        let summary = runtime::current_thread()?.block_on(async {
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                warn!("interrupted, stopping after the current step; press Ctrl-C again to exit now");
                cancel.cancel();

                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(INTERRUPTED);
                }
            });
            pipeline.run(&camera).await
        })?;

        let footer = format!(
            "archived {}, failed {}, skipped {}, leaked {}{}",
            summary.archived().count(),
            summary.failures().count(),
            summary.skipped(),
            summary.leaked(),
            if summary.cancelled {
                format!(", cancelled with {} unprocessed", summary.unprocessed)
            } else {
                String::new()
            }
        );
        let table = Formatter {
            footer: Some(footer),
            ..Default::default()
        }
        .build(summary.reports.iter().map(ReportRow::from));
        println!("{table}");

        Ok(if summary.is_clean() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}
