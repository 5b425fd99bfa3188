//! Temporal resolution: derives the single authoritative timestamp for a
//! post. The fallback chain is an ordered list of pure resolver functions
//! tried in sequence; the first success wins and a sentinel epoch guarantees
//! the chain is total, so resolution never fails and never returns null.

use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::post::Frontmatter;

static RE_FILE_NAME_FULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2}-\d{6})").unwrap());
static RE_FILE_NAME_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap());

/// Everything a resolver is allowed to look at.
pub struct ResolveInput<'a> {
    pub front: &'a Frontmatter,
    pub file_name: &'a str,
    pub mtime: Option<NaiveDateTime>,
}

type Resolver = fn(&ResolveInput) -> Option<NaiveDateTime>;

/// The fallback chain, most authoritative first. Kept as a list rather than
/// nested conditionals so the tie-break order is testable on its own.
const CHAIN: &[Resolver] = &[
    from_date_and_time,
    from_time,
    from_date,
    from_file_name,
    from_mtime,
];

/// Resolves the timestamp for a post. Total: falls back to the epoch
/// sentinel, which sorts last in newest-first order.
pub fn resolve(front: &Frontmatter, file_name: &str, mtime: Option<NaiveDateTime>) -> NaiveDateTime {
    let input = ResolveInput {
        front,
        file_name,
        mtime,
    };
    CHAIN
        .iter()
        .find_map(|resolver| resolver(&input))
        .unwrap_or_else(epoch)
}

/// The sentinel timestamp used when every other source fails.
pub fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap() // constant, always valid
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Reads a file's modification time as a local wall-clock datetime.
pub fn file_mtime(path: &Path) -> Option<NaiveDateTime> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let local: DateTime<Local> = modified.into();
    Some(local.naive_local())
}

/// Both `date` and `time` present: when `time` lacks a date component the
/// two are combined, otherwise `time` already carries the full datetime.
fn from_date_and_time(input: &ResolveInput) -> Option<NaiveDateTime> {
    let date = input.front.date.as_deref()?;
    let time = input.front.time.as_deref()?;
    if time.contains(':') && !time.contains('-') {
        parse_datetime(&format!("{} {}", date, time))
    } else {
        field_with_wall_clock(time, input.mtime)
    }
}

/// `time` alone: a date-only value (no colon) gets the file mtime's
/// wall-clock portion appended; otherwise the value is parsed as-is.
fn from_time(input: &ResolveInput) -> Option<NaiveDateTime> {
    field_with_wall_clock(input.front.time.as_deref()?, input.mtime)
}

/// `date` with no `time` field at all: same combination rule as a
/// date-only `time`. A present-but-unparseable `time` falls through to the
/// filename tier instead of landing here.
fn from_date(input: &ResolveInput) -> Option<NaiveDateTime> {
    if input.front.time.is_some() {
        return None;
    }
    field_with_wall_clock(input.front.date.as_deref()?, input.mtime)
}

fn field_with_wall_clock(value: &str, mtime: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    if value.contains(':') {
        parse_datetime(value)
    } else {
        let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()?;
        Some(date.and_time(wall_clock(mtime)))
    }
}

/// Extracts a timestamp from the file name: strict `YYYY-MM-DD-HHMMSS`
/// first, else a bare `YYYY-MM-DD` combined with the file mtime's
/// wall-clock portion.
fn from_file_name(input: &ResolveInput) -> Option<NaiveDateTime> {
    if let Some(caps) = RE_FILE_NAME_FULL.captures(input.file_name) {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&caps[1], "%Y-%m-%d-%H%M%S") {
            return Some(dt);
        }
    }
    let caps = RE_FILE_NAME_DATE.captures(input.file_name)?;
    let date = NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok()?;
    Some(date.and_time(wall_clock(input.mtime)))
}

fn from_mtime(input: &ResolveInput) -> Option<NaiveDateTime> {
    input.mtime
}

fn wall_clock(mtime: Option<NaiveDateTime>) -> NaiveTime {
    mtime
        .map(|m| m.time())
        .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap())
}

/// Tries the accepted metadata datetime formats in order: full datetime,
/// datetime without seconds, then date-only (midnight).
fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::from_hms_opt(0, 0, 0).unwrap()))
}

#[cfg(test)]
mod test {
    use super::*;

    fn front(date: Option<&str>, time: Option<&str>) -> Frontmatter {
        Frontmatter {
            date: date.map(str::to_owned),
            time: time.map(str::to_owned),
            ..Frontmatter::default()
        }
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_date_plus_bare_time_combined() {
        let f = front(Some("2026-02-01"), Some("09:00:00"));
        assert_eq!(resolve(&f, "x.md", None), dt("2026-02-01 09:00:00"));
    }

    #[test]
    fn test_full_time_wins_over_date() {
        let f = front(Some("2026-01-01"), Some("2026-02-01 09:30:00"));
        assert_eq!(resolve(&f, "x.md", None), dt("2026-02-01 09:30:00"));
    }

    #[test]
    fn test_time_without_seconds() {
        let f = front(None, Some("2026-02-01 09:30"));
        assert_eq!(resolve(&f, "x.md", None), dt("2026-02-01 09:30:00"));
    }

    #[test]
    fn test_date_only_takes_mtime_wall_clock() {
        let f = front(Some("2026-02-01"), None);
        let mtime = dt("2026-03-05 14:15:16");
        assert_eq!(
            resolve(&f, "x.md", Some(mtime)),
            dt("2026-02-01 14:15:16")
        );
    }

    #[test]
    fn test_file_name_full_form() {
        let f = Frontmatter::default();
        assert_eq!(
            resolve(&f, "2026-02-04-001401-auto.md", None),
            dt("2026-02-04 00:14:01")
        );
    }

    #[test]
    fn test_file_name_date_form() {
        let f = Frontmatter::default();
        let mtime = dt("2026-03-05 14:15:16");
        assert_eq!(
            resolve(&f, "2026-02-04-notes.md", Some(mtime)),
            dt("2026-02-04 14:15:16")
        );
    }

    #[test]
    fn test_mtime_fallback() {
        let f = Frontmatter::default();
        let mtime = dt("2026-03-05 14:15:16");
        assert_eq!(resolve(&f, "notes.md", Some(mtime)), mtime);
    }

    #[test]
    fn test_epoch_sentinel_is_total_and_sorts_last() {
        let f = Frontmatter::default();
        let resolved = resolve(&f, "notes.md", None);
        assert_eq!(resolved, epoch());
        assert!(resolved < dt("2026-01-01 00:00:00"));
    }

    #[test]
    fn test_unparseable_time_skips_date_tier() {
        // A `time` field that fails to parse disqualifies the date tier;
        // the chain continues to the filename.
        let f = front(Some("2026-02-01"), Some("??:bad"));
        let mtime = dt("2026-03-05 14:15:16");
        assert_eq!(
            resolve(&f, "2026-03-03-x.md", Some(mtime)),
            dt("2026-03-03 14:15:16")
        );
    }

    #[test]
    fn test_garbage_metadata_falls_through() {
        let f = front(Some("not a date"), Some("also not"));
        let mtime = dt("2026-03-05 14:15:16");
        assert_eq!(resolve(&f, "2026-02-04-x.md", Some(mtime)), dt("2026-02-04 14:15:16"));
    }
}
