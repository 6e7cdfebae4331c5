//! Error types and the user-facing error vocabulary.
//!
//! # Design
//! Two failure families never mix. `ValidationError` is produced before any
//! I/O and goes back to the caller as a structured error. `ApiError` covers
//! everything after the request leaves: it is built from an HTTP status or a
//! `TransportError` and always collapses into exactly one `"Error: "` string
//! through `user_message`, so a network outcome never escapes as a panic or a
//! library-specific error.

use std::fmt;

use thiserror::Error;

pub const NOT_FOUND_MESSAGE: &str = "Error: Study not found. Verify the NCT ID is correct.";
pub const BAD_REQUEST_MESSAGE: &str = "Error: Bad request — check your parameters.";
pub const RATE_LIMITED_MESSAGE: &str = "Error: Rate limit exceeded. Please wait before retrying.";
pub const TIMEOUT_MESSAGE: &str = "Error: Request timed out. Please try again.";

/// Outcome of the HTTP call wrapper when no response was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The per-call deadline elapsed.
    #[error("request timed out")]
    Timeout,

    /// Any other transport failure. `kind` names the failure category
    /// (e.g. `ConnectError`).
    #[error("{kind}: {message}")]
    Other { kind: String, message: String },
}

impl TransportError {
    pub fn other(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Other {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Errors returned by `CtGovClient` parse methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The registry returned 404.
    #[error("study not found")]
    NotFound,

    /// The registry returned 400; `detail` is the upstream body.
    #[error("bad request: {detail}")]
    BadRequest { detail: String },

    /// The registry returned 429.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Any other non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request timed out")]
    Timeout,

    /// Transport failures other than timeouts, and undecodable bodies.
    #[error("{kind}: {message}")]
    Unexpected { kind: String, message: String },
}

impl ApiError {
    /// Classify a non-success status code.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            404 => Self::NotFound,
            400 => Self::BadRequest {
                detail: body.trim().to_string(),
            },
            429 => Self::RateLimited,
            _ => Self::Status {
                status,
                body: body.to_string(),
            },
        }
    }

    /// The normalized string handed back to callers in place of a payload.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound => NOT_FOUND_MESSAGE.to_string(),
            Self::BadRequest { detail } if detail.is_empty() => BAD_REQUEST_MESSAGE.to_string(),
            Self::BadRequest { detail } => format!("{BAD_REQUEST_MESSAGE} Details: {detail}"),
            Self::RateLimited => RATE_LIMITED_MESSAGE.to_string(),
            Self::Status { status, body } => {
                format!("Error: API request failed with status {status}: {body}")
            }
            Self::Timeout => TIMEOUT_MESSAGE.to_string(),
            Self::Unexpected { kind, message } => {
                format!("Error: Unexpected error — {kind}: {message}")
            }
        }
    }

    /// Upstream status code, when the failure came from an HTTP response.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::NotFound => Some(404),
            Self::BadRequest { .. } => Some(400),
            Self::RateLimited => Some(429),
            Self::Status { status, .. } => Some(*status),
            Self::Timeout | Self::Unexpected { .. } => None,
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Self::Timeout,
            TransportError::Other { kind, message } => Self::Unexpected { kind, message },
        }
    }
}

/// One violated input constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Input key the constraint applies to; empty for whole-input failures.
    pub field: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Input rejected before any request was built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input: {}", render_violations(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![Violation {
            field: field.into(),
            message: message.into(),
        }])
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// True if any violation is reported against `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::single("", err.to_string())
    }
}

fn render_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(ApiError::from_status(404, "gone"), ApiError::NotFound);
        assert_eq!(ApiError::from_status(429, ""), ApiError::RateLimited);
        assert!(matches!(
            ApiError::from_status(400, " bad pageSize \n"),
            ApiError::BadRequest { detail } if detail == "bad pageSize"
        ));
        assert!(matches!(
            ApiError::from_status(503, "down"),
            ApiError::Status { status: 503, .. }
        ));
    }

    #[test]
    fn fixed_messages() {
        assert_eq!(
            ApiError::NotFound.user_message(),
            "Error: Study not found. Verify the NCT ID is correct."
        );
        assert_eq!(
            ApiError::RateLimited.user_message(),
            "Error: Rate limit exceeded. Please wait before retrying."
        );
        assert_eq!(
            ApiError::Timeout.user_message(),
            "Error: Request timed out. Please try again."
        );
    }

    #[test]
    fn bad_request_includes_detail_only_when_present() {
        let bare = ApiError::from_status(400, "");
        assert_eq!(bare.user_message(), "Error: Bad request — check your parameters.");

        let detailed = ApiError::from_status(400, "pageSize must be <= 1000");
        assert_eq!(
            detailed.user_message(),
            "Error: Bad request — check your parameters. Details: pageSize must be <= 1000"
        );
    }

    #[test]
    fn other_status_includes_code_and_body() {
        let err = ApiError::from_status(502, "bad gateway");
        assert_eq!(
            err.user_message(),
            "Error: API request failed with status 502: bad gateway"
        );
        assert_eq!(err.http_status(), Some(502));
    }

    #[test]
    fn transport_errors_map_to_timeout_or_unexpected() {
        assert_eq!(ApiError::from(TransportError::Timeout), ApiError::Timeout);

        let err = ApiError::from(TransportError::other("ConnectError", "connection refused"));
        assert_eq!(
            err.user_message(),
            "Error: Unexpected error — ConnectError: connection refused"
        );
        assert_eq!(err.http_status(), None);
    }

    #[test]
    fn validation_error_lists_every_violation() {
        let err = ValidationError::new(vec![
            Violation {
                field: "nct_id".to_string(),
                message: "must match ^NCT\\d+$".to_string(),
            },
            Violation {
                field: "page_size".to_string(),
                message: "must be between 1 and 1000".to_string(),
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("invalid input: "));
        assert!(text.contains("nct_id: must match"));
        assert!(text.contains("page_size: must be between 1 and 1000"));
        assert!(err.mentions("page_size"));
        assert!(!err.mentions("fields"));
    }
}
