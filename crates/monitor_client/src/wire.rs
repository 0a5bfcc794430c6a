//! JSON shapes exchanged with the backend and their mapping onto core types.

use monitor_core::{HistoryRecord, PreviewedResource, ProgressSnapshot, TaskStatus};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FailureKind, RequestError, StartOutcome};

const SUCCESS_CODE: i64 = 200;
/// Timestamp the backend writes for a job that has not ended.
const ZERO_TIME_PREFIX: &str = "0001-01-01";

#[derive(Debug, Serialize)]
pub(crate) struct JobRequest<'a> {
    pub url: &'a str,
    pub file_types: &'a [String],
}

/// `{code, message, data}`; some error paths say `msg` instead of `message`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

impl Envelope {
    pub(crate) fn message(&self) -> Option<String> {
        self.message
            .as_deref()
            .or(self.msg.as_deref())
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    /// Payload of a successful envelope; `None` when it carried no data.
    pub(crate) fn into_data<T: DeserializeOwned>(self) -> Result<Option<T>, RequestError> {
        let code = self.code.unwrap_or(SUCCESS_CODE);
        if code != SUCCESS_CODE {
            let message = self.message().unwrap_or_default();
            return Err(RequestError::new(FailureKind::Rejected { code }, message));
        }
        match self.data {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|err| RequestError::new(FailureKind::Decode, err.to_string())),
        }
    }
}

pub(crate) fn parse_envelope(body: &[u8]) -> Result<Envelope, RequestError> {
    serde_json::from_slice(body).map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))
}

#[derive(Debug, Deserialize)]
struct StartData {
    total_tasks: u64,
    #[serde(default)]
    started_at: Option<String>,
}

pub(crate) fn start_outcome(envelope: Envelope) -> Result<StartOutcome, RequestError> {
    let message = envelope.message();
    let data: Option<StartData> = envelope.into_data()?;
    Ok(StartOutcome {
        message,
        total_tasks: data.as_ref().map(|d| d.total_tasks),
        started_at: data.and_then(|d| d.started_at),
    })
}

#[derive(Debug, Deserialize)]
struct PreviewData {
    #[serde(default)]
    tasks: Vec<PreviewItem>,
}

#[derive(Debug, Deserialize)]
struct PreviewItem {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    filename: String,
    #[serde(rename = "type", default)]
    category: String,
}

pub(crate) fn preview_resources(envelope: Envelope) -> Result<Vec<PreviewedResource>, RequestError> {
    let data: Option<PreviewData> = envelope.into_data()?;
    Ok(data
        .map(|d| d.tasks)
        .unwrap_or_default()
        .into_iter()
        .map(|item| PreviewedResource {
            filename: item.filename,
            category: item.category,
            url: non_empty(item.url),
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    #[serde(default)]
    url: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    start_time: String,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    file_types: Option<Vec<String>>,
    #[serde(default)]
    completed: u64,
    #[serde(default)]
    total: u64,
    #[serde(default)]
    failed: u64,
}

pub(crate) fn history_records(envelope: Envelope) -> Result<Vec<HistoryRecord>, RequestError> {
    let entries: Option<Vec<HistoryEntry>> = envelope.into_data()?;
    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .map(|entry| HistoryRecord {
            url: entry.url,
            status: entry.status,
            start_time: entry.start_time,
            end_time: non_empty(entry.end_time).filter(|end| !end.starts_with(ZERO_TIME_PREFIX)),
            file_types: entry.file_types.unwrap_or_default(),
            completed: entry.completed,
            total: entry.total,
            failed: entry.failed,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct ProgressEvent {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    completed: u64,
    #[serde(default)]
    failed: u64,
    #[serde(default)]
    rate: f64,
    #[serde(default)]
    tasks: Option<Vec<TaskRecord>>,
}

#[derive(Debug, Deserialize)]
struct TaskRecord {
    #[serde(default)]
    url: String,
    #[serde(default)]
    status: String,
    #[serde(rename = "type", default)]
    category: Option<String>,
    #[serde(default)]
    filename: Option<String>,
}

/// Decodes one progress event payload.
pub fn decode_snapshot(payload: &str) -> Result<ProgressSnapshot, RequestError> {
    let event: ProgressEvent = serde_json::from_str(payload)
        .map_err(|err| RequestError::new(FailureKind::Decode, err.to_string()))?;
    Ok(ProgressSnapshot {
        total: event.total,
        completed: event.completed,
        failed: event.failed,
        rate: event.rate,
        tasks: event
            .tasks
            .unwrap_or_default()
            .into_iter()
            .map(|task| TaskStatus {
                url: task.url,
                status: task.status,
                category: non_empty(task.category),
                filename: non_empty(task.filename),
            })
            .collect(),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
