use std::pin::Pin;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use monitor_core::{HistoryRecord, PreviewedResource};
use monitor_logging::{monitor_debug, monitor_info};
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use url::Url;

use crate::wire::{self, Envelope, JobRequest};
use crate::{FailureKind, RequestError, StartOutcome};

/// Raw body chunks of the live progress stream.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, RequestError>> + Send>>;

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub server_url: String,
    pub connect_timeout: Duration,
    /// Applies to request/response calls only, never to the live stream.
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// The backend job executor as seen from the client.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn start_job(&self, url: &str, file_types: &[String]) -> Result<StartOutcome, RequestError>;

    async fn preview_job(
        &self,
        url: &str,
        file_types: &[String],
    ) -> Result<Vec<PreviewedResource>, RequestError>;

    async fn cancel_job(&self) -> Result<(), RequestError>;

    async fn list_history(&self) -> Result<Vec<HistoryRecord>, RequestError>;

    /// Connects to the live progress stream. Resolves once response headers
    /// have arrived.
    async fn open_progress(&self) -> Result<ByteStream, RequestError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base: Url,
    http: reqwest::Client,
    streaming: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: &ClientSettings) -> Result<Self, RequestError> {
        let mut base = Url::parse(&settings.server_url)
            .map_err(|err| RequestError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(RequestError::new(
                FailureKind::InvalidUrl,
                format!("unsupported scheme {}", base.scheme()),
            ));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))?;
        let streaming = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| RequestError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            base,
            http,
            streaming,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RequestError> {
        self.base
            .join(path)
            .map_err(|err| RequestError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// Stream endpoint with a `timestamp` cache buster.
    pub fn progress_url(&self) -> Result<Url, RequestError> {
        let mut url = self.endpoint("progress-sse")?;
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        url.query_pairs_mut()
            .append_pair("timestamp", &millis.to_string());
        Ok(url)
    }

    async fn post_job(&self, path: &str, url: &str, file_types: &[String]) -> Result<Envelope, RequestError> {
        let body = serde_json::to_vec(&JobRequest { url, file_types })
            .map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))?;
        let request = self
            .http
            .post(self.endpoint(path)?)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        send(request).await
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn start_job(&self, url: &str, file_types: &[String]) -> Result<StartOutcome, RequestError> {
        monitor_info!("POST /download url={} types={:?}", url, file_types);
        let envelope = self.post_job("download", url, file_types).await?;
        wire::start_outcome(envelope)
    }

    async fn preview_job(
        &self,
        url: &str,
        file_types: &[String],
    ) -> Result<Vec<PreviewedResource>, RequestError> {
        monitor_info!("POST /preview url={} types={:?}", url, file_types);
        let envelope = self.post_job("preview", url, file_types).await?;
        wire::preview_resources(envelope)
    }

    async fn cancel_job(&self) -> Result<(), RequestError> {
        monitor_info!("GET /cancel");
        let envelope = send(self.http.get(self.endpoint("cancel")?)).await?;
        envelope.into_data::<serde_json::Value>().map(|_| ())
    }

    async fn list_history(&self) -> Result<Vec<HistoryRecord>, RequestError> {
        let envelope = send(self.http.post(self.endpoint("history")?)).await?;
        wire::history_records(envelope)
    }

    async fn open_progress(&self) -> Result<ByteStream, RequestError> {
        let url = self.progress_url()?;
        monitor_debug!("Opening progress stream {}", url);
        let response = self
            .streaming
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        Ok(Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(map_reqwest_error)),
        ))
    }
}

/// Sends a request and unwraps the `{code, message, data}` envelope. A non-2xx
/// reply keeps the backend's message when its body has one.
async fn send(request: reqwest::RequestBuilder) -> Result<Envelope, RequestError> {
    let response = request.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    let body = response.bytes().await.map_err(map_reqwest_error)?;
    if !status.is_success() {
        let message = wire::parse_envelope(&body)
            .ok()
            .and_then(|envelope| envelope.message())
            .unwrap_or_default();
        return Err(RequestError::new(
            FailureKind::HttpStatus(status.as_u16()),
            message,
        ));
    }
    wire::parse_envelope(&body)
}

fn map_reqwest_error(err: reqwest::Error) -> RequestError {
    if err.is_timeout() {
        return RequestError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_builder() {
        return RequestError::new(FailureKind::InvalidUrl, err.to_string());
    }
    if err.is_decode() {
        return RequestError::new(FailureKind::Decode, err.to_string());
    }
    RequestError::new(FailureKind::Network, err.to_string())
}
