//! Monitor core: pure download-session state machine, presenter and formatter.
mod effect;
mod error;
pub mod format;
mod msg;
mod state;
mod types;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::{Notice, SessionError, Severity, GENERIC_REQUEST_FAILURE};
pub use msg::Msg;
pub use state::{AppState, ReconnectPolicy, SessionPhase, DEFAULT_RECONNECT_DELAY};
pub use types::{
    Categorized, HistoryRecord, PreviewedResource, ProgressSnapshot, SubscriptionId, TaskStatus,
    RECOGNIZED_FILE_TYPES,
};
pub use update::update;
pub use view_model::{
    render_aggregate, render_category_summary, render_history, render_preview_list,
    render_task_list, AggregateView, AppViewModel, CategoryCount, Controls, HistoryRowView,
    Listing, PreviewRowView, TaskRowView, HISTORY_PLACEHOLDER, PREVIEW_PLACEHOLDER,
    SUMMARY_PLACEHOLDER, URL_DISPLAY_CAP,
};
