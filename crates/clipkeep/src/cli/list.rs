use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use clipkeep_remote::{CameraService, NestService, Retrying};
use tracing::info;

use crate::cli::app::Overrides;
use crate::config::Settings;
use crate::utils::runtime;
use crate::utils::ui::table::{Formatter, SegmentRow};

#[derive(Args, Clone, Debug)]
pub struct ListArg {
    #[command(flatten)]
    pub overrides: Overrides,
}

impl ListArg {
    pub fn run(self, config_path: &Path) -> Result<ExitCode> {
        let settings = Settings::load(config_path, &self.overrides)?;
        let camera = settings.camera_config();
        let service = Retrying::new(
            NestService::new().context("failed to build HTTP client")?,
            settings.retry_policy(),
        );

        let segments = runtime::current_thread()?
            .block_on(service.list_segments(&camera))
            .context("failed to list recorded segments")?;
        info!(count = segments.len(), "segments discovered");

        let footer = format!("{} segment(s) before {}", segments.len(), camera.threshold);
        let table = Formatter {
            footer: Some(footer),
            ..Default::default()
        }
        .build(segments.iter().map(SegmentRow::from));
        println!("{table}");

        Ok(ExitCode::SUCCESS)
    }
}
