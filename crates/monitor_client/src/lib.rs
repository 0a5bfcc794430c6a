//! Monitor client: backend requests, the live progress stream and timers.
mod api;
mod client;
mod sse;
mod stream;
mod types;
mod wire;

pub use api::{Backend, ByteStream, ClientSettings, ReqwestBackend};
pub use client::ClientHandle;
pub use sse::SseDecoder;
pub use stream::{run_subscription, ChannelEventSink, EventSink};
pub use types::{ClientEvent, FailureKind, RequestError, StartOutcome};
pub use wire::decode_snapshot;
