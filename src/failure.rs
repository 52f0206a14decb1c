//! Structured remote-failure representation and recoverability
//! classification.
//!
//! The hosted SDKs surface "entity not found" in several inconsistent
//! shapes: an HTTP status, a top-level numeric code, a nested
//! error-object code, or only as a phrase buried in the message or the
//! serialized body. `classify` folds all of them into one tagged kind
//! so the orchestrator never string-matches inline.

use std::fmt;

use serde_json::Value;

/// The phrase the remote service uses when the configured API key does
/// not resolve to a usable model entity.
pub const NOT_FOUND_PHRASE: &str = "Requested entity was not found";

const NOT_FOUND_CODE: i64 = 404;

/// Everything known about a failed remote call, captured at the HTTP
/// boundary so later inspection never re-parses ad hoc.
#[derive(Debug, Clone, Default)]
pub struct RemoteFailure {
    /// HTTP status of the failed response, when the call got that far.
    pub http_status: Option<u16>,
    /// Top-level numeric error code reported by the service.
    pub code: Option<i64>,
    /// Service status string (e.g. `NOT_FOUND`), when present.
    pub status: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Raw response body, when it parsed as JSON.
    pub body: Option<Value>,
}

impl RemoteFailure {
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            ..Self::default()
        }
    }

    pub fn transport(err: reqwest::Error) -> Self {
        Self {
            http_status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
            ..Self::default()
        }
    }

    /// Build a failure from a non-success HTTP response body. The body
    /// is kept verbatim; the standard `{"error": {code, message,
    /// status}}` envelope is lifted into the structured fields when it
    /// parses.
    pub fn from_response(http_status: u16, body_text: &str) -> Self {
        let body: Option<Value> = serde_json::from_str(body_text).ok();
        let error_obj = body.as_ref().and_then(|v| v.get("error"));
        let code = error_obj.and_then(|e| e.get("code")).and_then(Value::as_i64);
        let status = error_obj
            .and_then(|e| e.get("status"))
            .and_then(Value::as_str)
            .map(str::to_owned);
        let message = error_obj
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| {
                if body_text.is_empty() {
                    format!("HTTP {http_status}")
                } else {
                    body_text.to_owned()
                }
            });

        Self {
            http_status: Some(http_status),
            code,
            status,
            message,
            body,
        }
    }

    /// Failure reported inside an otherwise-successful operation poll.
    pub fn from_operation_error(code: Option<i64>, message: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            body,
            ..Self::default()
        }
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.http_status, self.code) {
            (Some(http), _) => write!(f, "HTTP {http}: {}", self.message),
            (None, Some(code)) => write!(f, "code {code}: {}", self.message),
            (None, None) => write!(f, "{}", self.message),
        }
    }
}

/// Classified failure kind, the only input the recovery policy looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service could not resolve the requested entity for the
    /// active credential (404-family). Recoverable by selecting a
    /// different API key and retrying once.
    MissingEntity,
    /// Anything else. Hard failure, no automatic recovery.
    Other,
}

/// What the orchestrator is allowed to do about a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Invoke the host key-selection flow, then retry the submit once.
    ReselectKey,
    /// Propagate unmodified.
    None,
}

/// Fold every representation of "entity not found" into one kind.
pub fn classify(failure: &RemoteFailure) -> FailureKind {
    let nested_code = failure
        .body
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.get("code"))
        .and_then(Value::as_i64);

    let code_match = failure.http_status == Some(NOT_FOUND_CODE as u16)
        || failure.code == Some(NOT_FOUND_CODE)
        || nested_code == Some(NOT_FOUND_CODE);

    let text_match = failure.message.contains(NOT_FOUND_PHRASE)
        || failure
            .body
            .as_ref()
            .and_then(|v| serde_json::to_string(v).ok())
            .is_some_and(|s| s.contains(NOT_FOUND_PHRASE));

    if code_match || text_match {
        FailureKind::MissingEntity
    } else {
        FailureKind::Other
    }
}

/// Recovery policy table. Deliberately exhaustive so a new kind forces
/// an explicit decision here.
pub fn recovery_for(kind: FailureKind) -> Recovery {
    match kind {
        FailureKind::MissingEntity => Recovery::ReselectKey,
        FailureKind::Other => Recovery::None,
    }
}
