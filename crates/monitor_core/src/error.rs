use thiserror::Error;

/// Shown when a failed request carries no message of its own.
pub const GENERIC_REQUEST_FAILURE: &str = "请求失败";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Bad or missing local input. Never sent to the backend.
    #[error("{0}")]
    Validation(String),
    /// The backend refused a request or could not be reached.
    #[error("{message}")]
    Request { message: String },
    /// The live progress stream could not be recovered.
    #[error("{0}")]
    Stream(String),
}

impl SessionError {
    pub fn request(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_REQUEST_FAILURE.to_string());
        SessionError::Request { message }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient, auto-dismissing message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Severity::Success, text)
    }
}

impl From<&SessionError> for Notice {
    fn from(err: &SessionError) -> Self {
        let severity = match err {
            SessionError::Validation(_) => Severity::Warning,
            SessionError::Request { .. } | SessionError::Stream(_) => Severity::Error,
        };
        Notice::new(severity, err.to_string())
    }
}
