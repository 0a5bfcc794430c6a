use std::time::Duration;

use crate::{Notice, SubscriptionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the live progress stream. Any previously opened stream has
    /// already been closed by an earlier `CloseStream` in the same batch.
    OpenStream {
        subscription: SubscriptionId,
        /// For logging only. The backend serves progress for whichever job
        /// it is running, so the stream request does not carry it.
        job_url: String,
    },
    CloseStream { subscription: SubscriptionId },
    SubmitStart { url: String, file_types: Vec<String> },
    SubmitPreview { url: String, file_types: Vec<String> },
    SubmitCancel,
    FetchHistory,
    /// Deliver `Msg::ReconnectDue { token }` after `delay`.
    ScheduleReconnect {
        token: u64,
        attempt: u32,
        delay: Duration,
    },
    ShowNotice(Notice),
}
