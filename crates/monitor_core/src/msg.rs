use crate::{HistoryRecord, PreviewedResource, ProgressSnapshot, SubscriptionId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the target URL.
    UrlChanged(String),
    /// User changed the file-type filter. Empty means all categories.
    FileTypesChanged(Vec<String>),
    /// User asked to start downloading the current URL.
    StartClicked,
    /// User asked to list the resources of the current URL.
    PreviewClicked,
    /// User asked to cancel the running job.
    CancelClicked,
    /// User asked for the download history.
    HistoryClicked,
    /// Backend accepted the start request. `total_tasks` is absent when the
    /// backend found nothing to download.
    StartAccepted {
        message: Option<String>,
        total_tasks: Option<u64>,
    },
    /// Backend rejected the start request or could not be reached.
    StartRejected { message: Option<String> },
    /// Cancel request finished; `error` is set when it failed.
    CancelFinished { error: Option<String> },
    PreviewLoaded(Vec<PreviewedResource>),
    PreviewFailed { message: Option<String> },
    HistoryLoaded(Vec<HistoryRecord>),
    HistoryFailed { message: Option<String> },
    /// The progress stream is connected.
    StreamOpened { subscription: SubscriptionId },
    /// One decoded progress event.
    SnapshotReceived {
        subscription: SubscriptionId,
        snapshot: ProgressSnapshot,
    },
    /// Transport failure or end of the progress stream.
    StreamFailed {
        subscription: SubscriptionId,
        reason: String,
    },
    /// Reconnect timer fired.
    ReconnectDue { token: u64 },
    /// Fallback for placeholder wiring.
    NoOp,
}
