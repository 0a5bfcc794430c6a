use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use monitor_client::{ClientEvent, ClientHandle};
use monitor_core::{Effect, Msg, Notice};
use monitor_logging::{monitor_debug, monitor_info, monitor_warn};

use crate::app::AppEvent;

/// Carries effects out through the client and feeds its events back as `Msg`s.
pub struct EffectRunner {
    client: ClientHandle,
}

impl EffectRunner {
    pub fn new(client: ClientHandle, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let runner = Self { client };
        runner.spawn_event_loop(event_tx);
        runner
    }

    /// Runs `effects` in order and returns the notices among them for display.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::OpenStream {
                    subscription,
                    job_url,
                } => {
                    monitor_info!("OpenStream subscription={} job={}", subscription, job_url);
                    self.client.open_stream(subscription);
                }
                Effect::CloseStream { subscription } => {
                    monitor_debug!("CloseStream subscription={}", subscription);
                    self.client.close_stream(subscription);
                }
                Effect::SubmitStart { url, file_types } => self.client.start(url, file_types),
                Effect::SubmitPreview { url, file_types } => self.client.preview(url, file_types),
                Effect::SubmitCancel => self.client.cancel(),
                Effect::FetchHistory => self.client.history(),
                Effect::ScheduleReconnect {
                    token,
                    attempt,
                    delay,
                } => {
                    monitor_info!("Reconnect attempt {} scheduled in {:?}", attempt, delay);
                    self.client.schedule_reconnect(token, delay);
                }
                Effect::ShowNotice(notice) => notices.push(notice),
            }
        }
        notices
    }

    fn spawn_event_loop(&self, event_tx: mpsc::Sender<AppEvent>) {
        let client = self.client.clone();
        thread::spawn(move || loop {
            if let Some(event) = client.recv_timeout(Duration::from_millis(100)) {
                if event_tx.send(AppEvent::Msg(map_event(event))).is_err() {
                    break;
                }
            }
        });
    }
}

pub fn map_event(event: ClientEvent) -> Msg {
    match event {
        ClientEvent::StartFinished(Ok(outcome)) => Msg::StartAccepted {
            message: outcome.message,
            total_tasks: outcome.total_tasks,
        },
        ClientEvent::StartFinished(Err(err)) => {
            monitor_warn!("Start request failed: {}", err);
            Msg::StartRejected {
                message: err.user_message(),
            }
        }
        ClientEvent::PreviewFinished(Ok(resources)) => Msg::PreviewLoaded(resources),
        ClientEvent::PreviewFinished(Err(err)) => {
            monitor_warn!("Preview request failed: {}", err);
            Msg::PreviewFailed {
                message: err.user_message(),
            }
        }
        ClientEvent::CancelFinished(result) => Msg::CancelFinished {
            error: result.err().map(|err| {
                monitor_warn!("Cancel request failed: {}", err);
                err.user_message().unwrap_or_default()
            }),
        },
        ClientEvent::HistoryFinished(Ok(records)) => Msg::HistoryLoaded(records),
        ClientEvent::HistoryFinished(Err(err)) => {
            monitor_warn!("History request failed: {}", err);
            Msg::HistoryFailed {
                message: err.user_message(),
            }
        }
        ClientEvent::StreamOpened { subscription } => Msg::StreamOpened { subscription },
        ClientEvent::Snapshot {
            subscription,
            snapshot,
        } => Msg::SnapshotReceived {
            subscription,
            snapshot,
        },
        ClientEvent::StreamFailed {
            subscription,
            error,
        } => Msg::StreamFailed {
            subscription,
            reason: error.to_string(),
        },
        ClientEvent::ReconnectDue { token } => Msg::ReconnectDue { token },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_client::{FailureKind, RequestError, StartOutcome};

    fn error(kind: FailureKind, message: &str) -> RequestError {
        RequestError {
            kind,
            message: message.to_string(),
        }
    }

    #[test]
    fn accepted_start_carries_total() {
        let msg = map_event(ClientEvent::StartFinished(Ok(StartOutcome {
            message: Some("下载任务已开始".to_string()),
            total_tasks: Some(4),
            started_at: None,
        })));
        assert_eq!(
            msg,
            Msg::StartAccepted {
                message: Some("下载任务已开始".to_string()),
                total_tasks: Some(4),
            }
        );
    }

    #[test]
    fn rejected_start_without_message_leaves_fallback_to_core() {
        let msg = map_event(ClientEvent::StartFinished(Err(error(
            FailureKind::HttpStatus(500),
            "",
        ))));
        assert_eq!(msg, Msg::StartRejected { message: None });
    }

    #[test]
    fn failed_cancel_reports_an_error() {
        let msg = map_event(ClientEvent::CancelFinished(Err(error(
            FailureKind::Network,
            "connection refused",
        ))));
        assert_eq!(
            msg,
            Msg::CancelFinished {
                error: Some("connection refused".to_string())
            }
        );
        assert_eq!(
            map_event(ClientEvent::CancelFinished(Ok(()))),
            Msg::CancelFinished { error: None }
        );
    }

    #[test]
    fn stream_failure_keeps_subscription() {
        let msg = map_event(ClientEvent::StreamFailed {
            subscription: 3,
            error: error(FailureKind::Timeout, "read timed out"),
        });
        assert_eq!(
            msg,
            Msg::StreamFailed {
                subscription: 3,
                reason: "timeout: read timed out".to_string(),
            }
        );
    }
}
