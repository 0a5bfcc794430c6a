use std::collections::BTreeSet;
use std::time::Duration;

use monitor_logging::monitor_warn;

use crate::view_model::{
    render_aggregate, render_category_summary, render_history, render_preview_list,
    render_task_list, AppViewModel, CategoryCount, Controls, Listing,
};
use crate::{HistoryRecord, PreviewedResource, ProgressSnapshot, SubscriptionId};

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Starting,
    Active,
    Cancelling,
    Completed,
}

impl SessionPhase {
    /// A job has been requested and not yet finished or cancelled.
    pub fn is_in_flight(self) -> bool {
        matches!(self, SessionPhase::Starting | SessionPhase::Active)
    }
}

/// How the controller recovers from a dropped progress stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub delay: Duration,
    /// Consecutive failures tolerated before giving up. `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RECONNECT_DELAY,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    pub(crate) fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt <= max)
    }
}

/// The job of the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Job {
    pub(crate) url: String,
    pub(crate) file_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    phase: SessionPhase,
    url_input: String,
    file_types: BTreeSet<String>,
    job: Option<Job>,
    download_in_progress: bool,
    start_acknowledged: bool,
    subscription: Option<SubscriptionId>,
    stream_open: bool,
    next_subscription: SubscriptionId,
    reconnect: ReconnectPolicy,
    reconnect_failures: u32,
    pending_reconnect: Option<u64>,
    next_reconnect_token: u64,
    locked_total: Option<u64>,
    last_snapshot: Option<ProgressSnapshot>,
    summary: Option<Listing<CategoryCount>>,
    preview: Option<Vec<PreviewedResource>>,
    history: Option<Vec<HistoryRecord>>,
    preview_pending: bool,
    history_pending: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reconnect_policy(reconnect: ReconnectPolicy) -> Self {
        Self {
            reconnect,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn download_in_progress(&self) -> bool {
        self.download_in_progress
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        self.reconnect
    }

    pub fn view(&self) -> AppViewModel {
        let in_flight = self.phase.is_in_flight();
        let cancelling = self.phase == SessionPhase::Cancelling;
        let progress = match self.phase {
            SessionPhase::Idle => None,
            _ => Some(match &self.last_snapshot {
                Some(snapshot) => render_aggregate(snapshot, self.locked_total),
                None => render_aggregate(&ProgressSnapshot::default(), None),
            }),
        };
        let tasks = match (&self.last_snapshot, self.phase) {
            (_, SessionPhase::Idle) | (None, _) => Vec::new(),
            (Some(snapshot), _) => render_task_list(&snapshot.tasks),
        };

        AppViewModel {
            phase: self.phase,
            job_url: self.job.as_ref().map(|job| job.url.clone()),
            controls: Controls {
                start: !in_flight && !cancelling,
                preview: !in_flight && !cancelling,
                cancel: in_flight,
            },
            progress,
            tasks,
            summary: self.summary.clone(),
            preview: self.preview.as_deref().map(render_preview_list),
            history: self.history.as_deref().map(render_history),
            reconnecting: self.pending_reconnect.is_some(),
            busy: in_flight || cancelling || self.preview_pending || self.history_pending,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn url_input(&self) -> &str {
        &self.url_input
    }

    pub(crate) fn file_types(&self) -> &BTreeSet<String> {
        &self.file_types
    }

    pub(crate) fn set_url_input(&mut self, url: String) {
        self.url_input = url;
    }

    pub(crate) fn set_file_types(&mut self, file_types: Vec<String>) {
        self.file_types = file_types
            .into_iter()
            .map(|tag| tag.trim().to_ascii_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
    }

    pub(crate) fn job(&self) -> Option<&Job> {
        self.job.as_ref()
    }

    /// Detaches the current subscription, so it can only be closed once.
    pub(crate) fn take_subscription(&mut self) -> Option<SubscriptionId> {
        self.stream_open = false;
        self.subscription.take()
    }

    pub(crate) fn open_subscription(&mut self) -> SubscriptionId {
        self.next_subscription += 1;
        self.subscription = Some(self.next_subscription);
        self.stream_open = false;
        self.next_subscription
    }

    /// `Idle|Completed -> Starting`. Clears the previous job's progress.
    pub(crate) fn begin_job(&mut self, job: Job) -> SubscriptionId {
        self.phase = SessionPhase::Starting;
        self.job = Some(job);
        self.download_in_progress = true;
        self.start_acknowledged = false;
        self.reconnect_failures = 0;
        self.pending_reconnect = None;
        self.locked_total = None;
        self.last_snapshot = None;
        self.mark_dirty();
        self.open_subscription()
    }

    pub(crate) fn acknowledge_start(&mut self) {
        self.start_acknowledged = true;
        self.promote_if_ready();
        self.mark_dirty();
    }

    pub(crate) fn mark_stream_open(&mut self) {
        if !self.stream_open {
            self.stream_open = true;
            self.promote_if_ready();
            self.mark_dirty();
        }
    }

    fn promote_if_ready(&mut self) {
        if self.phase == SessionPhase::Starting && self.start_acknowledged && self.stream_open {
            self.phase = SessionPhase::Active;
        }
    }

    /// Records `snapshot` for display. The total is only locked once the
    /// backend has acknowledged the start; earlier snapshots may belong to the
    /// previous job.
    pub(crate) fn apply_snapshot(&mut self, snapshot: ProgressSnapshot) {
        self.reconnect_failures = 0;
        match self.locked_total {
            _ if !self.start_acknowledged => {}
            None if snapshot.total > 0 => self.locked_total = Some(snapshot.total),
            Some(locked) if snapshot.total != locked => {
                monitor_warn!(
                    "Snapshot total changed from {} to {}; keeping {} for display",
                    locked,
                    snapshot.total,
                    locked
                );
            }
            _ => {}
        }
        self.last_snapshot = Some(snapshot);
        self.mark_dirty();
    }

    pub(crate) fn last_snapshot(&self) -> Option<&ProgressSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// `Active -> Completed`. The caller has already detached the subscription.
    pub(crate) fn complete_job(&mut self) {
        self.phase = SessionPhase::Completed;
        self.download_in_progress = false;
        self.pending_reconnect = None;
        self.summary = self
            .last_snapshot
            .as_ref()
            .map(|snapshot| render_category_summary(&snapshot.tasks));
        self.mark_dirty();
    }

    /// `Starting|Active -> Cancelling`.
    pub(crate) fn begin_cancel(&mut self) {
        self.phase = SessionPhase::Cancelling;
        self.download_in_progress = false;
        self.pending_reconnect = None;
        self.mark_dirty();
    }

    /// Back to `Idle`, clearing the job and every in-flight indicator.
    pub(crate) fn reset_to_idle(&mut self) {
        self.phase = SessionPhase::Idle;
        self.job = None;
        self.download_in_progress = false;
        self.start_acknowledged = false;
        self.stream_open = false;
        self.subscription = None;
        self.reconnect_failures = 0;
        self.pending_reconnect = None;
        self.mark_dirty();
    }

    /// Counts a stream failure and returns the attempt number it leads to.
    pub(crate) fn record_stream_failure(&mut self) -> u32 {
        self.reconnect_failures += 1;
        self.mark_dirty();
        self.reconnect_failures
    }

    pub(crate) fn schedule_reconnect(&mut self) -> u64 {
        self.next_reconnect_token += 1;
        self.pending_reconnect = Some(self.next_reconnect_token);
        self.next_reconnect_token
    }

    /// Consumes the pending reconnect if `token` is the one currently scheduled.
    pub(crate) fn take_reconnect(&mut self, token: u64) -> bool {
        if self.pending_reconnect == Some(token) {
            self.pending_reconnect = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn preview_pending(&self) -> bool {
        self.preview_pending
    }

    pub(crate) fn set_preview_pending(&mut self, pending: bool) {
        self.preview_pending = pending;
    }

    pub(crate) fn set_preview(&mut self, resources: Vec<PreviewedResource>) {
        self.summary = Some(render_category_summary(&resources));
        self.preview = Some(resources);
        self.mark_dirty();
    }

    pub(crate) fn history_pending(&self) -> bool {
        self.history_pending
    }

    pub(crate) fn set_history_pending(&mut self, pending: bool) {
        self.history_pending = pending;
    }

    pub(crate) fn set_history(&mut self, records: Vec<HistoryRecord>) {
        self.history = Some(records);
        self.mark_dirty();
    }
}
