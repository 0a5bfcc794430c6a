//! Incremental decoder for `text/event-stream` bodies.
//!
//! Only `data` fields matter here: they accumulate until a blank line
//! dispatches the event. Comment lines and the other fields are dropped.

use monitor_logging::monitor_warn;

/// Longest line kept while waiting for its terminating newline.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Splits arbitrary byte chunks into complete event payloads.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    /// Bytes of `pending` already known to hold no newline.
    scanned: usize,
    /// Skipping the rest of an oversized line.
    discarding: bool,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the payloads it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);
        let mut events = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[self.scanned..].iter().position(|b| *b == b'\n') {
            let end = self.scanned + offset;
            self.scanned = end + 1;
            let line_start = std::mem::replace(&mut start, self.scanned);
            if self.discarding {
                self.discarding = false;
                continue;
            }
            let line = &self.pending[line_start..end];
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            let line = String::from_utf8_lossy(line).into_owned();
            if let Some(event) = self.take_line(&line) {
                events.push(event);
            }
        }
        self.pending.drain(..start);
        self.scanned = self.pending.len();

        if self.discarding {
            self.pending.clear();
            self.scanned = 0;
        } else if self.pending.len() > MAX_LINE_BYTES {
            monitor_warn!(
                "Dropping event stream line longer than {} bytes",
                MAX_LINE_BYTES
            );
            self.pending.clear();
            self.scanned = 0;
            self.data.clear();
            self.discarding = true;
        }
        events
    }

    fn take_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.data.is_empty() {
                return None;
            }
            return Some(std::mem::take(&mut self.data).join("\n"));
        }
        if line.starts_with(':') {
            return None;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }
}
