//! Display strings for status codes, timestamps, durations and URLs.
//!
//! Everything here is total: bad input yields a sentinel string, never an
//! error, so a single malformed record cannot break a whole listing.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime};

pub const INVALID_TIME: &str = "无效时间";
pub const INVALID_START_TIME: &str = "无效开始时间";
pub const INVALID_END_TIME: &str = "无效结束时间";
pub const IN_PROGRESS: &str = "进行中";
pub const UNKNOWN_STATUS: &str = "未知状态";
pub const ELLIPSIS: &str = "...";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Which set of status codes a label is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vocabulary {
    /// Per-item statuses inside a running job.
    Task,
    /// Whole-job statuses in the history listing.
    History,
}

/// Unknown task codes are shown verbatim, unknown history codes as
/// [`UNKNOWN_STATUS`].
pub fn status_label(status: &str, vocabulary: Vocabulary) -> String {
    let known = match vocabulary {
        Vocabulary::Task => match status {
            "pending" => Some("等待中"),
            "downloading" => Some("下载中"),
            "completed" => Some("已完成"),
            "failed" => Some("失败"),
            "skipped" => Some("已跳过"),
            _ => None,
        },
        Vocabulary::History => match status {
            "running" => Some(IN_PROGRESS),
            "completed" => Some("已完成"),
            "cancelled" => Some("已取消"),
            _ => Some(UNKNOWN_STATUS),
        },
    };
    known.map_or_else(|| status.to_string(), str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Moment {
    Zoned(DateTime<FixedOffset>),
    Naive(NaiveDateTime),
}

impl Moment {
    fn millis(self) -> i64 {
        match self {
            Moment::Zoned(dt) => dt.timestamp_millis(),
            Moment::Naive(dt) => dt.and_utc().timestamp_millis(),
        }
    }
}

fn parse_moment(value: &str) -> Option<Moment> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(Moment::Zoned(dt));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(Moment::Naive(dt));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(Moment::Naive)
}

/// Zoned timestamps are shown in local time; naive ones as given.
pub fn format_timestamp(value: &str) -> String {
    match parse_moment(value) {
        Some(Moment::Zoned(dt)) => dt.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
        Some(Moment::Naive(dt)) => dt.format(DISPLAY_FORMAT).to_string(),
        None => INVALID_TIME.to_string(),
    }
}

/// `{minutes}分{seconds}秒` between two timestamps; [`IN_PROGRESS`] while the
/// end is unknown.
pub fn format_duration(start: &str, end: Option<&str>) -> String {
    let Some(end) = end.filter(|e| !e.trim().is_empty()) else {
        return IN_PROGRESS.to_string();
    };
    let Some(start) = parse_moment(start) else {
        return INVALID_START_TIME.to_string();
    };
    let Some(end) = parse_moment(end) else {
        return INVALID_END_TIME.to_string();
    };
    format_elapsed_millis(end.millis() - start.millis())
}

pub fn format_elapsed_millis(diff_ms: i64) -> String {
    let minutes = diff_ms.div_euclid(60_000);
    let seconds = (diff_ms.rem_euclid(60_000) as f64 / 1000.0).round() as i64;
    format!("{minutes}分{seconds}秒")
}

/// Cuts `url` to at most `max_chars` characters, the ellipsis included.
pub fn shorten_url(url: &str, max_chars: usize) -> String {
    if url.chars().count() <= max_chars {
        return url.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut shortened: String = url.chars().take(keep).collect();
    shortened.push_str(ELLIPSIS);
    shortened
}

pub fn format_rate(rate: f64) -> String {
    if rate.is_finite() {
        format!("{rate:.2}")
    } else {
        "0.00".to_string()
    }
}

/// One decimal, without a trailing `.0`: `0%`, `66.7%`, `100%`.
pub fn format_percent(percent: f64) -> String {
    let rounded = (percent * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}%")
    } else {
        format!("{rounded:.1}%")
    }
}
