use serde::Deserialize;

use crate::ErrorCode;

/// Structured error body returned by the platform on non-success statuses.
///
/// `message` is required so that arbitrary non-conforming bodies fall back
/// to a generic status-line message instead of half-parsed fields.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    #[serde(default)]
    pub code: Option<ErrorCode>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::ApiErrorBody;
    use crate::ErrorCode;

    #[test]
    fn parses_full_error_body() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"message":"table not found","code":"NOT_FOUND","details":{"table":"users"}}"#,
        )
        .expect("must parse");
        assert_eq!(body.message, "table not found");
        assert_eq!(body.code, Some(ErrorCode::NotFound));
        assert_eq!(body.details.unwrap()["table"], "users");
    }

    #[test]
    fn code_and_details_are_optional() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"message":"boom"}"#).expect("must parse");
        assert_eq!(body.message, "boom");
        assert!(body.code.is_none());
        assert!(body.details.is_none());
    }

    #[test]
    fn missing_message_is_rejected() {
        let parsed = serde_json::from_str::<ApiErrorBody>(r#"{"error":"boom"}"#);
        assert!(parsed.is_err());
    }
}
