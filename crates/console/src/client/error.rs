//! Normalized API errors.

use portfolio_core::InputError;
use reqwest::StatusCode;
use thiserror::Error;

/// Message used when neither the backend nor the transport said anything.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// A failed API call, classified at the client boundary.
///
/// Every variant carries the normalized message shown to the user. `Display`
/// renders that message verbatim; branch on the variant, never on the text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The backend rejected the credential (401/403).
    #[error("{message}")]
    Unauthorized { status: u16, message: String },

    /// The record or route does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// The payload was rejected, by the backend (400/422) or before sending.
    #[error("{0}")]
    Validation(String),

    /// Any other non-success response.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// No response was received (connect failure, timeout, broken body).
    #[error("{0}")]
    Transport(String),

    /// A success response whose body did not decode.
    #[error("{0}")]
    Decode(String),
}

impl ApiError {
    /// Classify a non-success response.
    ///
    /// `body_message` is the structured message extracted from the response
    /// body; without one the message falls back to the status line.
    #[must_use]
    pub fn from_status(status: StatusCode, body_message: Option<String>) -> Self {
        let message = body_message
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized {
                status: status.as_u16(),
                message,
            },
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::Validation(message),
            _ => Self::Server {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Classify a transport failure.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let message = err.to_string();
        if message.trim().is_empty() {
            return Self::Transport(GENERIC_ERROR_MESSAGE.to_string());
        }
        Self::Transport(message)
    }

    /// The normalized, user-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Unauthorized { message, .. } | Self::Server { message, .. } => message,
            Self::NotFound(message)
            | Self::Validation(message)
            | Self::Transport(message)
            | Self::Decode(message) => message,
        }
    }

    /// HTTP status of the response, when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::Validation(_) | Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Whether the session is missing or expired.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Short machine-readable label for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Server { .. } => "server",
            Self::Transport(_) => "transport",
            Self::Decode(_) => "decode",
        }
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Extract the structured message from an error response body.
///
/// Looks at `message`, then `error`, then the first entry of an `errors`
/// array (either a string or an object with `msg`/`message`).
#[must_use]
pub fn extract_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;

    let non_blank = |v: &serde_json::Value| {
        v.as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
    };

    if let Some(message) = value.get("message").and_then(non_blank) {
        return Some(message);
    }
    if let Some(error) = value.get("error") {
        if let Some(message) = non_blank(error) {
            return Some(message);
        }
        if let Some(message) = error.get("message").and_then(non_blank) {
            return Some(message);
        }
    }

    let first = value.get("errors")?.as_array()?.first()?;
    non_blank(first)
        .or_else(|| first.get("msg").and_then(non_blank))
        .or_else(|| first.get("message").and_then(non_blank))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, None).is_unauthorized());
        assert!(ApiError::from_status(StatusCode::FORBIDDEN, None).is_unauthorized());
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, None),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, None),
            ApiError::Validation(_)
        ));
        assert_eq!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, None).status(),
            Some(502)
        );
    }

    #[test]
    fn test_body_message_takes_priority() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            Some("No token provided".to_string()),
        );
        assert_eq!(err.to_string(), "No token provided");
        assert_eq!(err.kind(), "unauthorized");
    }

    #[test]
    fn test_fallback_to_status_line() {
        let err = ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, None);
        assert_eq!(err.message(), "Request failed with status code 500");
    }

    #[test]
    fn test_extract_message_variants() {
        assert_eq!(
            extract_message(br#"{"message":"Project not found"}"#).as_deref(),
            Some("Project not found")
        );
        assert_eq!(
            extract_message(br#"{"success":false,"error":"Invalid token"}"#).as_deref(),
            Some("Invalid token")
        );
        assert_eq!(
            extract_message(br#"{"error":{"message":"nested"}}"#).as_deref(),
            Some("nested")
        );
        assert_eq!(
            extract_message(br#"{"errors":[{"msg":"name is required"}]}"#).as_deref(),
            Some("name is required")
        );
        assert_eq!(extract_message(br#"{"message":"  "}"#), None);
        assert_eq!(extract_message(b"<html>Bad Gateway</html>"), None);
        assert_eq!(extract_message(b""), None);
    }

    #[test]
    fn test_input_error_becomes_validation() {
        let err = ApiError::from(InputError::MissingField("courseName"));
        assert_eq!(err, ApiError::Validation("courseName is required".to_string()));
        assert_eq!(err.status(), None);
    }
}
