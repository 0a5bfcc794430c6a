use monitor_logging::{monitor_debug, monitor_info, monitor_trace, monitor_warn};

use crate::state::Job;
use crate::{
    AppState, Effect, Msg, Notice, ProgressSnapshot, SessionError, SessionPhase, Severity,
    SubscriptionId, RECOGNIZED_FILE_TYPES,
};

const EMPTY_URL: &str = "请输入有效的网址";
const NOTHING_TO_DOWNLOAD: &str = "未找到可下载的资源";
const NOTHING_FOUND: &str = "未找到任何资源";
const JOB_FINISHED: &str = "下载任务完成!";
const JOB_CANCELLED: &str = "下载已取消";
const RECONNECTING: &str = "连接中断，正在尝试重连...";
const RECONNECT_EXHAUSTED: &str = "连接中断，重连失败";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlChanged(url) => {
            state.set_url_input(url);
            Vec::new()
        }
        Msg::FileTypesChanged(file_types) => {
            state.set_file_types(file_types);
            Vec::new()
        }
        Msg::StartClicked => start_job(&mut state),
        Msg::PreviewClicked => request_preview(&mut state),
        Msg::CancelClicked => cancel_job(&mut state),
        Msg::HistoryClicked => {
            if state.history_pending() {
                Vec::new()
            } else {
                state.set_history_pending(true);
                vec![Effect::FetchHistory]
            }
        }
        Msg::StartAccepted {
            message,
            total_tasks,
        } => start_accepted(&mut state, message, total_tasks),
        Msg::StartRejected { message } => {
            if state.phase() != SessionPhase::Starting {
                monitor_debug!("Ignoring start rejection in phase {:?}", state.phase());
                return (state, Vec::new());
            }
            let err = SessionError::request(message);
            monitor_warn!("Start request failed: {}", err);
            let mut effects = close_stream(&mut state);
            state.reset_to_idle();
            effects.push(Effect::ShowNotice(Notice::from(&err)));
            effects
        }
        Msg::CancelFinished { error } => {
            if state.phase() != SessionPhase::Cancelling {
                return (state, Vec::new());
            }
            state.reset_to_idle();
            let notice = match error {
                None => Notice::success(JOB_CANCELLED),
                Some(message) => {
                    let err = SessionError::request(Some(message));
                    monitor_warn!("Cancel request failed: {}", err);
                    Notice::from(&err)
                }
            };
            vec![Effect::ShowNotice(notice)]
        }
        Msg::PreviewLoaded(resources) => {
            state.set_preview_pending(false);
            if resources.is_empty() {
                vec![Effect::ShowNotice(Notice::info(NOTHING_FOUND))]
            } else {
                monitor_info!("Preview listed {} resources", resources.len());
                state.set_preview(resources);
                Vec::new()
            }
        }
        Msg::PreviewFailed { message } => {
            state.set_preview_pending(false);
            let err = SessionError::request(message);
            vec![Effect::ShowNotice(Notice::from(&err))]
        }
        Msg::HistoryLoaded(records) => {
            state.set_history_pending(false);
            state.set_history(records);
            Vec::new()
        }
        Msg::HistoryFailed { message } => {
            state.set_history_pending(false);
            let err = SessionError::request(message);
            vec![Effect::ShowNotice(Notice::from(&err))]
        }
        Msg::StreamOpened { subscription } => {
            if state.subscription() == Some(subscription) {
                monitor_debug!("Progress stream {} open", subscription);
                state.mark_stream_open();
            }
            Vec::new()
        }
        Msg::SnapshotReceived {
            subscription,
            snapshot,
        } => snapshot_received(&mut state, subscription, snapshot),
        Msg::StreamFailed {
            subscription,
            reason,
        } => stream_failed(&mut state, subscription, &reason),
        Msg::ReconnectDue { token } => {
            if !state.take_reconnect(token) || !state.download_in_progress() {
                return (state, Vec::new());
            }
            let Some(job_url) = state.job().map(|job| job.url.clone()) else {
                return (state, Vec::new());
            };
            let subscription = state.open_subscription();
            monitor_info!("Reconnecting progress stream as {}", subscription);
            vec![Effect::OpenStream {
                subscription,
                job_url,
            }]
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Checks the URL and file-type filter before anything reaches the backend.
fn validated_job(state: &AppState) -> Result<Job, SessionError> {
    let url = state.url_input().trim();
    if url.is_empty() {
        return Err(SessionError::Validation(EMPTY_URL.to_string()));
    }
    if let Some(unknown) = state
        .file_types()
        .iter()
        .find(|tag| !RECOGNIZED_FILE_TYPES.contains(&tag.as_str()))
    {
        return Err(SessionError::Validation(format!("不支持的文件类型: {unknown}")));
    }
    Ok(Job {
        url: url.to_string(),
        file_types: state.file_types().iter().cloned().collect(),
    })
}

fn start_job(state: &mut AppState) -> Vec<Effect> {
    if session_busy(state) {
        monitor_debug!("Start ignored in phase {:?}", state.phase());
        return Vec::new();
    }
    let job = match validated_job(state) {
        Ok(job) => job,
        Err(err) => return vec![Effect::ShowNotice(Notice::from(&err))],
    };

    monitor_info!("Starting job for {} types={:?}", job.url, job.file_types);
    let mut effects = close_stream(state);
    let subscription = state.begin_job(job.clone());
    effects.push(Effect::OpenStream {
        subscription,
        job_url: job.url.clone(),
    });
    effects.push(Effect::SubmitStart {
        url: job.url,
        file_types: job.file_types,
    });
    effects
}

fn request_preview(state: &mut AppState) -> Vec<Effect> {
    if session_busy(state) || state.preview_pending() {
        return Vec::new();
    }
    match validated_job(state) {
        Ok(job) => {
            state.set_preview_pending(true);
            vec![Effect::SubmitPreview {
                url: job.url,
                file_types: job.file_types,
            }]
        }
        Err(err) => vec![Effect::ShowNotice(Notice::from(&err))],
    }
}

fn cancel_job(state: &mut AppState) -> Vec<Effect> {
    if !state.phase().is_in_flight() {
        return Vec::new();
    }
    monitor_info!("Cancelling job");
    let mut effects = close_stream(state);
    state.begin_cancel();
    effects.push(Effect::SubmitCancel);
    effects
}

fn start_accepted(
    state: &mut AppState,
    message: Option<String>,
    total_tasks: Option<u64>,
) -> Vec<Effect> {
    if state.phase() != SessionPhase::Starting {
        monitor_debug!("Ignoring start acknowledgement in phase {:?}", state.phase());
        return Vec::new();
    }
    match total_tasks {
        Some(total) => {
            monitor_info!("Backend accepted job with {} tasks", total);
            state.acknowledge_start();
            Vec::new()
        }
        None => {
            let mut effects = close_stream(state);
            state.reset_to_idle();
            let text = message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| NOTHING_TO_DOWNLOAD.to_string());
            effects.push(Effect::ShowNotice(Notice::info(text)));
            effects
        }
    }
}

fn snapshot_received(
    state: &mut AppState,
    subscription: SubscriptionId,
    snapshot: ProgressSnapshot,
) -> Vec<Effect> {
    if state.subscription() != Some(subscription) || !state.download_in_progress() {
        monitor_trace!("Dropping snapshot from stale subscription {}", subscription);
        return Vec::new();
    }
    state.mark_stream_open();
    let terminal = snapshot.is_terminal();
    state.apply_snapshot(snapshot);

    // Snapshots seen before the backend acknowledged the start may still
    // describe the previous job.
    if state.phase() != SessionPhase::Active || !terminal {
        return Vec::new();
    }

    if let Some(snapshot) = state.last_snapshot() {
        monitor_info!(
            "Job finished: completed={} failed={} total={}",
            snapshot.completed,
            snapshot.failed,
            snapshot.total
        );
    }
    let mut effects = close_stream(state);
    state.complete_job();
    effects.push(Effect::ShowNotice(Notice::success(JOB_FINISHED)));
    effects
}

fn stream_failed(state: &mut AppState, subscription: SubscriptionId, reason: &str) -> Vec<Effect> {
    if state.subscription() != Some(subscription) {
        monitor_debug!(
            "Absorbing failure of inactive stream {}: {}",
            subscription,
            reason
        );
        return Vec::new();
    }

    let mut effects = close_stream(state);
    if !state.download_in_progress() {
        return effects;
    }

    let attempt = state.record_stream_failure();
    let policy = state.reconnect_policy();
    if !policy.allows(attempt) {
        let err = SessionError::Stream(RECONNECT_EXHAUSTED.to_string());
        monitor_warn!(
            "Progress stream lost after {} reconnect attempts: {}",
            attempt - 1,
            reason
        );
        state.reset_to_idle();
        effects.push(Effect::ShowNotice(Notice::from(&err)));
        return effects;
    }

    monitor_warn!(
        "Progress stream {} failed ({}); reconnect attempt {} in {:?}",
        subscription,
        reason,
        attempt,
        policy.delay
    );
    let token = state.schedule_reconnect();
    effects.push(Effect::ShowNotice(Notice::new(Severity::Warning, RECONNECTING)));
    effects.push(Effect::ScheduleReconnect {
        token,
        attempt,
        delay: policy.delay,
    });
    effects
}

fn session_busy(state: &AppState) -> bool {
    state.phase().is_in_flight() || state.phase() == SessionPhase::Cancelling
}

/// Emits at most one `CloseStream` for the current subscription.
fn close_stream(state: &mut AppState) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(3);
    if let Some(subscription) = state.take_subscription() {
        effects.push(Effect::CloseStream { subscription });
    }
    effects
}
