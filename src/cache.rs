//! The incremental-build decision for detail pages. Old posts dominate the
//! corpus and almost never change, so their detail pages are skipped when
//! provably fresh; everything else is regenerated every run. The decision
//! is a pure function of timestamps gathered by the caller, recomputed each
//! run and never persisted.

use std::path::Path;

use chrono::{Duration, NaiveDateTime};

use crate::time;

/// Posts older than this many days are eligible for the skip.
pub const MAX_AGE_DAYS: i64 = 30;

/// Decides whether a detail page must be regenerated. A missing output
/// always renders. An existing output is skipped only when the post is
/// older than the age threshold relative to `now` AND the source mtime is
/// not strictly newer than the output mtime, so an edited old post is never
/// left stale.
pub fn should_render(
    resolved: NaiveDateTime,
    source_mtime: Option<NaiveDateTime>,
    output_mtime: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> bool {
    let output_mtime = match output_mtime {
        None => return true,
        Some(t) => t,
    };
    if resolved >= now - Duration::days(MAX_AGE_DAYS) {
        return true;
    }
    match source_mtime {
        // Can't prove freshness without a source mtime.
        None => true,
        Some(source_mtime) => source_mtime > output_mtime,
    }
}

/// Filesystem-facing wrapper: gathers the two mtimes for `should_render`.
pub fn should_render_path(
    resolved: NaiveDateTime,
    source: &Path,
    output: &Path,
    now: NaiveDateTime,
) -> bool {
    if !output.exists() {
        return true;
    }
    should_render(
        resolved,
        time::file_mtime(source),
        time::file_mtime(output),
        now,
    )
}
