use std::collections::HashMap;
use std::io;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use monitor_core::SubscriptionId;
use monitor_logging::{monitor_debug, monitor_info};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::stream::{run_subscription, ChannelEventSink, EventSink};
use crate::{Backend, ClientEvent};

enum ClientCommand {
    Start { url: String, file_types: Vec<String> },
    Preview { url: String, file_types: Vec<String> },
    Cancel,
    History,
    OpenStream { subscription: SubscriptionId },
    CloseStream { subscription: SubscriptionId },
    Timer { token: u64, delay: Duration },
}

/// Runs all backend I/O on a dedicated thread with its own tokio runtime.
///
/// Commands are fire-and-forget; outcomes come back as [`ClientEvent`]s on a
/// single channel, in the order they happened.
#[derive(Clone)]
pub struct ClientHandle {
    cmd_tx: mpsc::Sender<ClientCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<ClientEvent>>>,
}

impl ClientHandle {
    pub fn spawn(backend: Arc<dyn Backend>) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("monitor-client".to_string())
            .spawn(move || command_loop(runtime, backend, cmd_rx, event_tx))?;

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn start(&self, url: impl Into<String>, file_types: Vec<String>) {
        self.send(ClientCommand::Start {
            url: url.into(),
            file_types,
        });
    }

    pub fn preview(&self, url: impl Into<String>, file_types: Vec<String>) {
        self.send(ClientCommand::Preview {
            url: url.into(),
            file_types,
        });
    }

    pub fn cancel(&self) {
        self.send(ClientCommand::Cancel);
    }

    pub fn history(&self) {
        self.send(ClientCommand::History);
    }

    /// Opens `subscription`, closing whatever stream was open before.
    pub fn open_stream(&self, subscription: SubscriptionId) {
        self.send(ClientCommand::OpenStream { subscription });
    }

    pub fn close_stream(&self, subscription: SubscriptionId) {
        self.send(ClientCommand::CloseStream { subscription });
    }

    /// Emits `ClientEvent::ReconnectDue { token }` after `delay`.
    pub fn schedule_reconnect(&self, token: u64, delay: Duration) {
        self.send(ClientCommand::Timer { token, delay });
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<ClientEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    fn send(&self, command: ClientCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

fn command_loop(
    runtime: Runtime,
    backend: Arc<dyn Backend>,
    cmd_rx: mpsc::Receiver<ClientCommand>,
    event_tx: mpsc::Sender<ClientEvent>,
) {
    let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));
    let mut streams: HashMap<SubscriptionId, CancellationToken> = HashMap::new();

    while let Ok(command) = cmd_rx.recv() {
        match command {
            ClientCommand::OpenStream { subscription } => {
                for (previous, token) in streams.drain() {
                    monitor_debug!("Closing stream {} before opening {}", previous, subscription);
                    token.cancel();
                }
                let token = CancellationToken::new();
                streams.insert(subscription, token.clone());
                let backend = backend.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    run_subscription(backend.as_ref(), subscription, token, sink.as_ref()).await;
                });
            }
            ClientCommand::CloseStream { subscription } => {
                if let Some(token) = streams.remove(&subscription) {
                    token.cancel();
                }
            }
            ClientCommand::Timer { token, delay } => {
                let sink = sink.clone();
                runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    sink.emit(ClientEvent::ReconnectDue { token });
                });
            }
            request => {
                let backend = backend.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    let event = handle_request(backend.as_ref(), request).await;
                    if let Some(event) = event {
                        sink.emit(event);
                    }
                });
            }
        }
    }

    for token in streams.into_values() {
        token.cancel();
    }
    monitor_info!("Client command loop stopped");
}

async fn handle_request(backend: &dyn Backend, command: ClientCommand) -> Option<ClientEvent> {
    let event = match command {
        ClientCommand::Start { url, file_types } => {
            ClientEvent::StartFinished(backend.start_job(&url, &file_types).await)
        }
        ClientCommand::Preview { url, file_types } => {
            ClientEvent::PreviewFinished(backend.preview_job(&url, &file_types).await)
        }
        ClientCommand::Cancel => ClientEvent::CancelFinished(backend.cancel_job().await),
        ClientCommand::History => ClientEvent::HistoryFinished(backend.list_history().await),
        ClientCommand::OpenStream { .. }
        | ClientCommand::CloseStream { .. }
        | ClientCommand::Timer { .. } => return None,
    };
    Some(event)
}
