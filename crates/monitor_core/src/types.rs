/// Identifies one live-updates subscription. A fresh id is allocated on every
/// (re)open so events from a torn-down stream can be told apart.
pub type SubscriptionId = u64;

/// Category tags the backend understands. An empty filter means all of them.
pub const RECOGNIZED_FILE_TYPES: [&str; 10] = [
    "image", "script", "style", "video", "audio", "font", "document", "archive", "html", "data",
];

/// Point-in-time progress report pushed by the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgressSnapshot {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    /// Items per second.
    pub rate: f64,
    pub tasks: Vec<TaskStatus>,
}

impl ProgressSnapshot {
    /// `completed + failed >= total` with a known nonzero total.
    pub fn is_terminal(&self) -> bool {
        self.total > 0 && self.completed.saturating_add(self.failed) >= self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    pub url: String,
    /// Raw status code (`pending`, `downloading`, ...). Unknown codes are kept.
    pub status: String,
    pub category: Option<String>,
    pub filename: Option<String>,
}

impl TaskStatus {
    pub fn new(url: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: status.into(),
            category: None,
            filename: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A resource discovered by a preview request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewedResource {
    pub filename: String,
    pub category: String,
    pub url: Option<String>,
}

/// A past job as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub url: String,
    pub status: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub file_types: Vec<String>,
    pub completed: u64,
    pub total: u64,
    pub failed: u64,
}

/// Anything that can be counted in the per-category summary.
pub trait Categorized {
    fn category(&self) -> Option<&str>;
}

impl Categorized for TaskStatus {
    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl Categorized for PreviewedResource {
    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }
}
