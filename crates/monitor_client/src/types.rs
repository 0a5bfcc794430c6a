use std::fmt;

use monitor_core::{HistoryRecord, PreviewedResource, ProgressSnapshot, SubscriptionId};
use thiserror::Error;

/// What the backend said when it accepted a start request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartOutcome {
    pub message: Option<String>,
    /// Absent when the backend found nothing to download.
    pub total_tasks: Option<u64>,
    pub started_at: Option<String>,
}

/// Everything the client reports back, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    StartFinished(Result<StartOutcome, RequestError>),
    PreviewFinished(Result<Vec<PreviewedResource>, RequestError>),
    CancelFinished(Result<(), RequestError>),
    HistoryFinished(Result<Vec<HistoryRecord>, RequestError>),
    StreamOpened {
        subscription: SubscriptionId,
    },
    Snapshot {
        subscription: SubscriptionId,
        snapshot: ProgressSnapshot,
    },
    /// The stream could not be opened, broke, or ended.
    StreamFailed {
        subscription: SubscriptionId,
        error: RequestError,
    },
    ReconnectDue {
        token: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct RequestError {
    pub kind: FailureKind,
    /// Backend message when it sent one, otherwise transport detail.
    pub message: String,
}

impl RequestError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Text for the user, or `None` to let the caller pick a generic one.
    pub fn user_message(&self) -> Option<String> {
        let trimmed = self.message.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    /// Body was not the JSON we expected.
    Decode,
    /// Transport succeeded but the envelope carried a non-success code.
    Rejected { code: i64 },
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Rejected { code } => write!(f, "rejected with code {code}"),
        }
    }
}
