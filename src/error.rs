use serde::{Deserialize, Serialize};

/// Machine-readable error code carried by classified errors.
///
/// API responses carry these in the error body; the client synthesizes
/// `TimeoutError` and `NetworkError` for non-HTTP failures. Codes the
/// client does not know deserialize as [`ErrorCode::Unknown`].
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    TimeoutError,
    NetworkError,
    Unauthorized,
    Forbidden,
    NotFound,
    ValidationError,
    RateLimited,
    InternalError,
    #[serde(other)]
    Unknown,
}

impl ErrorCode {
    /// Wire name of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::TimeoutError => "TIMEOUT_ERROR",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

/// Error type returned by this crate.
///
/// Callers distinguish failure kinds by [`QuarryError::status_code`]
/// (0 means the failure happened before an HTTP status was received) and
/// [`QuarryError::code`].
#[derive(Debug, thiserror::Error)]
pub enum QuarryError {
    /// An attempt's timeout fired and retries were exhausted.
    #[error("Request timeout")]
    Timeout,
    /// The transport failed before receiving an HTTP status.
    #[error("Network error: {message}")]
    Network {
        /// Underlying transport error text.
        message: String,
    },
    /// Non-success HTTP status with the platform's parsed error fields.
    #[error("api error {status}: {message}")]
    Api {
        /// HTTP status code of the failing response.
        status: u16,
        /// Error message from the response body, or a generic message
        /// derived from the status line when the body was unparseable.
        message: String,
        /// Machine-readable code from the response body, if present.
        code: Option<ErrorCode>,
        /// Structured details payload from the response body, if present.
        details: Option<serde_json::Value>,
    },
    /// A success or error body failed to parse. Never retried.
    #[error("decode error: {0}")]
    Decode(String),
}

impl QuarryError {
    /// HTTP status code of the failure, or 0 for non-HTTP failures.
    pub fn status_code(&self) -> u16 {
        match self {
            QuarryError::Api { status, .. } => *status,
            QuarryError::Timeout | QuarryError::Network { .. } | QuarryError::Decode(_) => 0,
        }
    }

    /// Machine-readable code of the failure, if one applies.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            QuarryError::Timeout => Some(ErrorCode::TimeoutError),
            QuarryError::Network { .. } => Some(ErrorCode::NetworkError),
            QuarryError::Api { code, .. } => *code,
            QuarryError::Decode(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorCode, QuarryError};

    #[test]
    fn timeout_carries_fixed_code_and_zero_status() {
        let err = QuarryError::Timeout;
        assert_eq!(err.status_code(), 0);
        assert_eq!(err.code(), Some(ErrorCode::TimeoutError));
        assert_eq!(err.to_string(), "Request timeout");
    }

    #[test]
    fn network_embeds_transport_message() {
        let err = QuarryError::Network {
            message: "dns failure".to_owned(),
        };
        assert_eq!(err.status_code(), 0);
        assert_eq!(err.code(), Some(ErrorCode::NetworkError));
        assert!(err.to_string().contains("dns failure"));
    }

    #[test]
    fn api_error_exposes_parsed_fields() {
        let err = QuarryError::Api {
            status: 422,
            message: "bad column".to_owned(),
            code: Some(ErrorCode::ValidationError),
            details: None,
        };
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.code(), Some(ErrorCode::ValidationError));
    }

    #[test]
    fn unknown_code_deserializes_to_fallback() {
        let code: ErrorCode = serde_json::from_str("\"SOMETHING_NEW\"").expect("must parse");
        assert_eq!(code, ErrorCode::Unknown);
        let code: ErrorCode = serde_json::from_str("\"RATE_LIMITED\"").expect("must parse");
        assert_eq!(code, ErrorCode::RateLimited);
    }
}
