use std::fmt;

use ecosort_core::{ClassificationResult, RequestId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Always sent exactly once per classify command; failures arrive as the
    /// unrecognized fallback result.
    ClassificationCompleted {
        request_id: RequestId,
        result: ClassificationResult,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ClassifyError {
    pub kind: FailureKind,
    pub message: String,
}

impl ClassifyError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    MissingApiKey,
    InvalidEndpoint,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
    EmptyResponse,
    Malformed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MissingApiKey => write!(f, "no api key configured"),
            FailureKind::InvalidEndpoint => write!(f, "invalid service endpoint"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
            FailureKind::EmptyResponse => write!(f, "empty response"),
            FailureKind::Malformed => write!(f, "malformed answer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_error_reads_as_kind_then_detail() {
        let err = ClassifyError::new(FailureKind::MissingApiKey, "set ECOSORT_API_KEY");
        assert_eq!(err.to_string(), "no api key configured: set ECOSORT_API_KEY");

        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        assert!(boxed.source().is_none());
    }
}
