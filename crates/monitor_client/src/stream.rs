use std::sync::mpsc;

use futures_util::StreamExt;
use monitor_core::SubscriptionId;
use monitor_logging::{monitor_debug, monitor_warn};
use tokio_util::sync::CancellationToken;

use crate::sse::SseDecoder;
use crate::wire::decode_snapshot;
use crate::{Backend, ClientEvent, FailureKind, RequestError};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: ClientEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<ClientEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<ClientEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }
}

/// Drives one subscription until it fails, ends, or `token` is cancelled.
///
/// Emits `StreamOpened` once connected, a `Snapshot` per decodable event and
/// a single `StreamFailed` when the transport gives out. A cancelled
/// subscription goes quiet without a failure event. Payloads that do not
/// decode are logged and skipped.
pub async fn run_subscription(
    backend: &dyn Backend,
    subscription: SubscriptionId,
    token: CancellationToken,
    sink: &dyn EventSink,
) {
    let connected = tokio::select! {
        _ = token.cancelled() => return,
        result = backend.open_progress() => result,
    };
    let mut body = match connected {
        Ok(body) => body,
        Err(error) => {
            monitor_warn!("Progress stream {} failed to open: {}", subscription, error);
            sink.emit(ClientEvent::StreamFailed {
                subscription,
                error,
            });
            return;
        }
    };
    sink.emit(ClientEvent::StreamOpened { subscription });

    let mut decoder = SseDecoder::new();
    loop {
        let chunk = tokio::select! {
            _ = token.cancelled() => {
                monitor_debug!("Progress stream {} closed", subscription);
                return;
            }
            chunk = body.next() => chunk,
        };
        let bytes = match chunk {
            Some(Ok(bytes)) => bytes,
            Some(Err(error)) => {
                sink.emit(ClientEvent::StreamFailed {
                    subscription,
                    error,
                });
                return;
            }
            None => {
                sink.emit(ClientEvent::StreamFailed {
                    subscription,
                    error: RequestError::new(FailureKind::Network, "stream ended"),
                });
                return;
            }
        };
        for payload in decoder.push(&bytes) {
            if token.is_cancelled() {
                return;
            }
            match decode_snapshot(&payload) {
                Ok(snapshot) => sink.emit(ClientEvent::Snapshot {
                    subscription,
                    snapshot,
                }),
                Err(err) => {
                    monitor_warn!(
                        "Skipping malformed progress event on stream {}: {}",
                        subscription,
                        err
                    );
                }
            }
        }
    }
}
