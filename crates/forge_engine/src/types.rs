use std::fmt;

use forge_core::{AnalysisOutcome, Msg, RequestId, ScrapedRecord, ServiceFailure};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    AnalysisProgress {
        request_id: RequestId,
        status: String,
    },
    AnalysisCompleted {
        request_id: RequestId,
        result: Result<AnalysisOutcome, ServiceError>,
    },
    RunCompleted {
        request_id: RequestId,
        result: Result<Vec<ScrapedRecord>, ServiceError>,
    },
    CsvCompleted {
        request_id: RequestId,
        result: Result<Vec<u8>, ServiceError>,
    },
}

impl EngineEvent {
    /// Translates a completion into the workflow message it settles.
    pub fn into_msg(self) -> Msg {
        match self {
            EngineEvent::AnalysisProgress { request_id, status } => {
                Msg::AnalysisProgress { request_id, status }
            }
            EngineEvent::AnalysisCompleted { request_id, result } => match result {
                Ok(outcome) => Msg::AnalysisSucceeded {
                    request_id,
                    outcome,
                },
                Err(err) => Msg::AnalysisFailed {
                    request_id,
                    failure: err.into_failure(),
                },
            },
            EngineEvent::RunCompleted { request_id, result } => match result {
                Ok(records) => Msg::RunSucceeded {
                    request_id,
                    records,
                },
                Err(err) => Msg::RunFailed {
                    request_id,
                    failure: err.into_failure(),
                },
            },
            EngineEvent::CsvCompleted { request_id, result } => match result {
                Ok(payload) => Msg::CsvDownloaded {
                    request_id,
                    payload,
                },
                Err(err) => Msg::CsvExportFailed {
                    request_id,
                    failure: err.into_failure(),
                },
            },
        }
    }
}

/// A failed backend call.
///
/// `message` is the backend's own error text, when it sent one. Transport
/// failures leave it empty so the workflow shows its generic text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {}", .message.as_deref().unwrap_or("no message"))]
pub struct ServiceError {
    pub kind: FailureKind,
    pub message: Option<String>,
    pub traceback: Option<String>,
    pub errors: Option<String>,
}

impl ServiceError {
    pub(crate) fn new(kind: FailureKind, message: Option<String>) -> Self {
        Self {
            kind,
            message,
            traceback: None,
            errors: None,
        }
    }

    pub(crate) fn decode(message: Option<&str>) -> Self {
        Self::new(FailureKind::Decode, message.map(str::to_string))
    }

    pub fn into_failure(self) -> ServiceFailure {
        ServiceFailure {
            message: self.message,
            traceback: self.traceback,
            errors: self.errors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    /// The backend reported an error inside a successful response stream.
    Backend,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Backend => write!(f, "backend error"),
        }
    }
}
