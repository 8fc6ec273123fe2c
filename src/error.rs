//! Error taxonomy for the Nimbus Cloud API client.
//!
//! Transport failures propagate untouched; every unexpected HTTP status is
//! mapped to a typed variant so callers can match on the failure class.
//! Reauthentication failures are kept distinct from the errors of the
//! request that triggered them.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level failure; the request never produced an HTTP status.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("bad request: {message}")]
    BadRequest { message: String },
    #[error("authentication required: {message}")]
    Unauthorized { message: String },
    #[error("forbidden: {message}")]
    Forbidden { message: String },
    #[error("resource not found: {message}")]
    NotFound { message: String },
    #[error("method not allowed: {message}")]
    MethodNotAllowed { message: String },
    #[error("request timeout: {message}")]
    RequestTimeout { message: String },
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("too many requests: {message}")]
    TooManyRequests { message: String },
    #[error("internal server error: {message}")]
    InternalServerError { message: String },
    #[error("bad gateway: {message}")]
    BadGateway { message: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String },
    #[error("gateway timeout: {message}")]
    GatewayTimeout { message: String },
    #[error("unexpected HTTP status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("unable to reauthenticate: {message}")]
    ReauthFailed { message: String },
    #[error("error after reauthentication: {source}")]
    AfterReauth { source: Box<ApiError> },

    #[error("request options define both a JSON body and a raw body")]
    AmbiguousBody,
    #[error("invalid header {name:?}")]
    InvalidHeader { name: String },
    #[error("response envelope is missing the {label:?} field")]
    MissingEnvelope { label: String },
    #[error("JSON decoding error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("query string encoding error: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),
    #[error("{0}")]
    Validation(#[from] crate::validation::ValidationError),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("cannot decode {key} information in task structure")]
    TaskMissingResource { key: String },
    #[error("task {id} finished with an error: {message}")]
    TaskFailed { id: String, message: String },
}

impl ApiError {
    /// Map an unexpected HTTP status to its typed variant, consulting the
    /// caller-supplied per-status overrides first.
    pub fn from_status(status: u16, body_message: String, context: Option<&ErrorContext>) -> Self {
        let message = context
            .and_then(|c| c.message_for(status))
            .map(str::to_owned)
            .unwrap_or(body_message);

        match status {
            400 => ApiError::BadRequest { message },
            401 => ApiError::Unauthorized { message },
            403 => ApiError::Forbidden { message },
            404 => ApiError::NotFound { message },
            405 => ApiError::MethodNotAllowed { message },
            408 => ApiError::RequestTimeout { message },
            409 => ApiError::Conflict { message },
            429 => ApiError::TooManyRequests { message },
            500 => ApiError::InternalServerError { message },
            502 => ApiError::BadGateway { message },
            503 => ApiError::ServiceUnavailable { message },
            504 => ApiError::GatewayTimeout { message },
            _ => ApiError::UnexpectedStatus { status, message },
        }
    }

    /// The HTTP status behind this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::BadRequest { .. } => Some(400),
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::NotFound { .. } => Some(404),
            ApiError::MethodNotAllowed { .. } => Some(405),
            ApiError::RequestTimeout { .. } => Some(408),
            ApiError::Conflict { .. } => Some(409),
            ApiError::TooManyRequests { .. } => Some(429),
            ApiError::InternalServerError { .. } => Some(500),
            ApiError::BadGateway { .. } => Some(502),
            ApiError::ServiceUnavailable { .. } => Some(503),
            ApiError::GatewayTimeout { .. } => Some(504),
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            ApiError::AfterReauth { source } => source.status(),
            _ => None,
        }
    }

    /// True when the error denotes a missing resource. Delete-confirmation
    /// logic treats this as "already gone".
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Per-status message overrides applied when an unexpected status is mapped
/// to a typed error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    overrides: HashMap<u16, String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(mut self, status: u16, message: impl Into<String>) -> Self {
        self.overrides.insert(status, message.into());
        self
    }

    pub fn message_for(&self, status: u16) -> Option<&str> {
        self.overrides.get(&status).map(String::as_str)
    }
}

/// Pull a human-readable message out of an error response body. Nimbus API
/// errors carry `{"message": "..."}`; anything else is passed through as-is.
pub fn message_from_body(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_owned)
            .unwrap_or_else(|| body.to_owned()),
        Err(_) => body.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_known_codes() {
        let err = ApiError::from_status(404, "no such instance".to_string(), None);
        assert!(matches!(err, ApiError::NotFound { .. }));
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());

        let err = ApiError::from_status(503, "maintenance".to_string(), None);
        assert!(matches!(err, ApiError::ServiceUnavailable { .. }));
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn test_from_status_unknown_code_falls_through() {
        let err = ApiError::from_status(418, "teapot".to_string(), None);
        match err {
            ApiError::UnexpectedStatus { status, message } => {
                assert_eq!(status, 418);
                assert_eq!(message, "teapot");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_error_context_overrides_message() {
        let context = ErrorContext::new().with_message(404, "volume does not exist");
        let err = ApiError::from_status(404, "not found".to_string(), Some(&context));
        assert_eq!(err.to_string(), "resource not found: volume does not exist");

        // Statuses without an override keep the body message.
        let err = ApiError::from_status(409, "already attached".to_string(), Some(&context));
        assert_eq!(err.to_string(), "conflict: already attached");
    }

    #[test]
    fn test_message_from_body_unwraps_message_field() {
        assert_eq!(
            message_from_body(r#"{"message":"quota exceeded"}"#),
            "quota exceeded"
        );
        assert_eq!(message_from_body("plain text"), "plain text");
        assert_eq!(message_from_body(r#"{"detail":"x"}"#), r#"{"detail":"x"}"#);
    }

    #[test]
    fn test_after_reauth_reports_inner_status() {
        let inner = ApiError::Unauthorized {
            message: "token rejected".to_string(),
        };
        let err = ApiError::AfterReauth {
            source: Box::new(inner),
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().starts_with("error after reauthentication"));
    }
}
