use chrono::Local;
use clipkeep_pipeline::{Outcome, Removal, SegmentReport, SkipReason};
use clipkeep_remote::{RecordedSegment, clip_title};
use tabled::{
    Table, Tabled,
    settings::{Panel, Style},
};

#[derive(Debug, Clone, Default)]
pub struct Formatter {
    pub footer: Option<String>,
}

impl Formatter {
    pub fn build<T: Tabled, I: IntoIterator<Item = T>>(self, data: I) -> Table {
        let mut table = Table::new(data);
        if let Some(footer) = self.footer {
            table.with(Panel::footer(footer));
        }

        table.with(Style::blank());
        table
    }
}

fn local_time(timestamp: i64) -> String {
    clip_title(timestamp, &Local).unwrap_or_else(|| timestamp.to_string())
}

#[derive(Debug, Tabled)]
pub struct SegmentRow {
    pub start: String,
    pub end: String,
    #[tabled(rename = "length")]
    pub duration: String,
    pub video: &'static str,
}

impl From<&RecordedSegment> for SegmentRow {
    fn from(segment: &RecordedSegment) -> Self {
        Self {
            start: local_time(segment.start()),
            end: local_time(segment.end()),
            duration: format!("{}s", segment.duration()),
            video: if segment.has_video() { "yes" } else { "no" },
        }
    }
}

#[derive(Debug, Tabled)]
pub struct ReportRow {
    pub start: String,
    pub end: String,
    pub outcome: String,
    pub detail: String,
}

impl From<&SegmentReport> for ReportRow {
    fn from(report: &SegmentReport) -> Self {
        let (outcome, detail) = match &report.outcome {
            Outcome::Archived(archived) => {
                let outcome = match archived.removal {
                    Removal::Deleted(_) => "archived",
                    Removal::Leaked(_) => "archived (not deleted)",
                };
                (outcome.to_string(), archived.path.display().to_string())
            }
            Outcome::Skipped(SkipReason::NoVideo) => ("skipped".to_string(), "no video".to_string()),
            Outcome::Failed(err) => (format!("{}: {}", err.stage, err.kind()), err.cause.to_string()),
        };

        Self {
            start: local_time(report.segment.start()),
            end: local_time(report.segment.end()),
            outcome,
            detail,
        }
    }
}
