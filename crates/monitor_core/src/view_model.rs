use crate::format::{
    format_duration, format_percent, format_rate, format_timestamp, shorten_url, status_label,
    Vocabulary,
};
use crate::{Categorized, HistoryRecord, PreviewedResource, ProgressSnapshot, SessionPhase, TaskStatus};

/// Display cap for URLs in every list.
pub const URL_DISPLAY_CAP: usize = 50;
pub const SUMMARY_PLACEHOLDER: &str = "暂无分类统计信息";
pub const PREVIEW_PLACEHOLDER: &str = "未找到任何资源";
pub const HISTORY_PLACEHOLDER: &str = "暂无历史记录";

/// A rendered list, or the placeholder shown instead of an empty one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing<T> {
    Rows(Vec<T>),
    Placeholder(&'static str),
}

impl<T> Listing<T> {
    fn from_rows(rows: Vec<T>, placeholder: &'static str) -> Self {
        if rows.is_empty() {
            Listing::Placeholder(placeholder)
        } else {
            Listing::Rows(rows)
        }
    }

    pub fn rows(&self) -> &[T] {
        match self {
            Listing::Rows(rows) => rows,
            Listing::Placeholder(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub phase: SessionPhase,
    pub job_url: Option<String>,
    pub controls: Controls,
    pub progress: Option<AggregateView>,
    pub tasks: Vec<TaskRowView>,
    pub summary: Option<Listing<CategoryCount>>,
    pub preview: Option<Listing<PreviewRowView>>,
    pub history: Option<Listing<HistoryRowView>>,
    /// A reconnect is scheduled and the stream is currently down.
    pub reconnecting: bool,
    /// A job or a request is outstanding.
    pub busy: bool,
    pub dirty: bool,
}

/// Which user actions are currently offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub start: bool,
    pub preview: bool,
    pub cancel: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            start: true,
            preview: true,
            cancel: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateView {
    /// Width of the progress indicator, 0.0 to 100.0.
    pub percent: f64,
    pub percent_label: String,
    pub completed: u64,
    pub failed: u64,
    pub total: u64,
    pub rate: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRowView {
    pub url: String,
    pub status: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRowView {
    pub filename: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRowView {
    pub status_label: String,
    pub status: String,
    pub started: String,
    pub url: String,
    pub file_types: String,
    pub duration: String,
    pub counts: String,
}

/// Aggregate counters and the proportional indicator for one snapshot.
///
/// `locked_total` is the total first reported for the job and wins for the
/// displayed total; the indicator uses the snapshot's own total, and is full
/// once the snapshot is terminal.
pub fn render_aggregate(snapshot: &ProgressSnapshot, locked_total: Option<u64>) -> AggregateView {
    let percent = if snapshot.total == 0 {
        0.0
    } else if snapshot.is_terminal() {
        100.0
    } else {
        (snapshot.completed as f64 / snapshot.total as f64 * 100.0).min(100.0)
    };
    AggregateView {
        percent,
        percent_label: format_percent(percent),
        completed: snapshot.completed,
        failed: snapshot.failed,
        total: locked_total.unwrap_or(snapshot.total),
        rate: format_rate(snapshot.rate),
    }
}

pub fn render_task_list(tasks: &[TaskStatus]) -> Vec<TaskRowView> {
    tasks
        .iter()
        .map(|task| TaskRowView {
            url: shorten_url(&task.url, URL_DISPLAY_CAP),
            status: task.status.clone(),
            label: status_label(&task.status, Vocabulary::Task),
        })
        .collect()
}

/// Counts per category in first-seen order. Items without a category are
/// left out.
pub fn render_category_summary<T: Categorized>(items: &[T]) -> Listing<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for category in items
        .iter()
        .filter_map(Categorized::category)
        .filter(|c| !c.is_empty())
    {
        match counts.iter_mut().find(|entry| entry.category == category) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                category: category.to_string(),
                count: 1,
            }),
        }
    }
    Listing::from_rows(counts, SUMMARY_PLACEHOLDER)
}

pub fn render_preview_list(resources: &[PreviewedResource]) -> Listing<PreviewRowView> {
    let rows = resources
        .iter()
        .map(|resource| PreviewRowView {
            filename: resource.filename.clone(),
            category: resource.category.clone(),
        })
        .collect();
    Listing::from_rows(rows, PREVIEW_PLACEHOLDER)
}

pub fn render_history(records: &[HistoryRecord]) -> Listing<HistoryRowView> {
    let rows = records
        .iter()
        .map(|record| HistoryRowView {
            status_label: status_label(&record.status, Vocabulary::History),
            status: record.status.clone(),
            started: format_timestamp(&record.start_time),
            url: shorten_url(&record.url, URL_DISPLAY_CAP),
            file_types: record.file_types.join(", "),
            duration: format_duration(&record.start_time, record.end_time.as_deref()),
            counts: format!(
                "完成 {}/{} 项（失败 {}）",
                record.completed, record.total, record.failed
            ),
        })
        .collect();
    Listing::from_rows(rows, HISTORY_PLACEHOLDER)
}
