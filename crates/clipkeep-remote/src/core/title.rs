use std::fmt::Display;

use chrono::TimeZone;

/// Sortable timestamp layout used for clip titles and filename stems.
pub const TITLE_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Render `start` (unix seconds) as a clip title in `tz`.
///
/// Returns `None` when the timestamp is outside chrono's representable range.
pub fn clip_title<Tz: TimeZone>(start: i64, tz: &Tz) -> Option<String>
where
    Tz::Offset: Display,
{
    tz.timestamp_opt(start, 0)
        .earliest()
        .map(|at| at.format(TITLE_FORMAT).to_string())
}
