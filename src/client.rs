use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{header, Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    body::{build_form, RequestBody},
    config::{ClientConfig, ConfigUpdate},
    wire::ApiErrorBody,
    Apps, Files, HeaderMap, Queries, QuarryError, ResponseEnvelope, Result, Tables,
};

/// Joins the configured base address with a relative path.
///
/// The base's trailing slash is stripped and the path's leading slash is
/// enforced, so `"https://api.quarry.dev/"` + `"query"` and
/// `"https://api.quarry.dev"` + `"/query"` produce the same URL.
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[derive(Clone)]
/// HTTP client for the Quarry data platform API.
///
/// One dispatch call issues at most one in-flight attempt at a time and
/// resolves to exactly one outcome. Cloned clients share configuration:
/// an [`QuarryClient::update_config`] through any clone is seen by calls
/// issued afterwards on all clones.
pub struct QuarryClient {
    http: reqwest::Client,
    config: Arc<RwLock<ClientConfig>>,
}

impl fmt::Debug for QuarryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuarryClient")
            .field("config", &self.config_snapshot())
            .finish()
    }
}

impl QuarryClient {
    /// Creates a client with the given access token and default settings.
    ///
    /// If the token is missing the `Bearer ` prefix, it is added
    /// automatically when the authorization header is built.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_config(ClientConfig::new(token))
    }

    /// Creates a client from a full configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(RwLock::new(config)),
        }
    }

    /// Sets the base address, keeping all other settings.
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        self.update_config(ConfigUpdate::default().base_url(base_url));
        self
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `QUARRY_TOKEN` — access token (Bearer prefix optional)
    /// - `QUARRY_BASE_URL` — optional base address override
    ///
    /// Returns an error if the token is missing or empty.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use quarry_http::QuarryClient;
    ///
    /// let client = QuarryClient::from_env().expect("missing QUARRY_TOKEN");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        let token = std::env::var("QUARRY_TOKEN")
            .map_err(|_| "missing QUARRY_TOKEN environment variable".to_owned())?;
        if token.trim().is_empty() {
            return Err("QUARRY_TOKEN is set but empty".to_owned());
        }
        let mut config = ClientConfig::new(token);
        if let Ok(base_url) = std::env::var("QUARRY_BASE_URL") {
            if !base_url.trim().is_empty() {
                config.base_url = base_url;
            }
        }
        Ok(Self::with_config(config))
    }

    /// Returns a snapshot of the current configuration.
    pub fn config(&self) -> ClientConfig {
        self.config_snapshot()
    }

    /// Applies a partial configuration update.
    ///
    /// Last writer wins. In-flight dispatches keep the snapshot they took
    /// at call start; only calls issued after the update see the new
    /// values.
    pub fn update_config(&self, update: ConfigUpdate) {
        self.config
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(update);
    }

    /// Query execution service.
    pub fn queries(&self) -> Queries<'_> {
        Queries::new(self)
    }

    /// Table management service.
    pub fn tables(&self) -> Tables<'_> {
        Tables::new(self)
    }

    /// File upload service.
    pub fn files(&self) -> Files<'_> {
        Files::new(self)
    }

    /// App invocation service.
    pub fn apps(&self) -> Apps<'_> {
        Apps::new(self)
    }

    /// Dispatches one request with authentication, timeout and retry
    /// applied, and decodes the response body into `T`.
    ///
    /// Timeouts, connection failures and 5xx statuses are retried up to
    /// the configured attempt count with linearly increasing delays;
    /// 4xx statuses and decode failures surface immediately.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
        headers: Option<HeaderMap>,
    ) -> Result<ResponseEnvelope<T>> {
        let config = self.config_snapshot();
        let url = join_url(&config.base_url, path);
        let (status, body) = self
            .send_with_retry(&config, method, &url, body.as_ref(), headers.as_ref())
            .await?;

        let data = serde_json::from_str::<T>(&body).map_err(|err| {
            QuarryError::Decode(format!("invalid response JSON: {err}; body: {body}"))
        })?;
        Ok(ResponseEnvelope::new(data, status))
    }

    /// `GET` with no body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ResponseEnvelope<T>> {
        self.request(Method::GET, path, None, None).await
    }

    /// `POST` with a JSON body.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<ResponseEnvelope<T>> {
        self.request(Method::POST, path, Some(RequestBody::json(body)?), None)
            .await
    }

    /// `POST` with a raw text body and optional extra headers.
    pub async fn post_text<T: DeserializeOwned>(
        &self,
        path: &str,
        text: impl Into<String>,
        headers: Option<HeaderMap>,
    ) -> Result<ResponseEnvelope<T>> {
        self.request(
            Method::POST,
            path,
            Some(RequestBody::Text(text.into())),
            headers,
        )
        .await
    }

    /// `POST` with a binary body and optional explicit content type.
    pub async fn post_binary<T: DeserializeOwned>(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ResponseEnvelope<T>> {
        self.request(
            Method::POST,
            path,
            Some(RequestBody::Binary {
                bytes,
                content_type,
            }),
            None,
        )
        .await
    }

    /// `POST` with a multipart form body.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: Vec<crate::FormField>,
    ) -> Result<ResponseEnvelope<T>> {
        self.request(Method::POST, path, Some(RequestBody::Multipart(fields)), None)
            .await
    }

    /// `DELETE` with no body.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<ResponseEnvelope<T>> {
        self.request(Method::DELETE, path, None, None).await
    }

    async fn send_with_retry(
        &self,
        config: &ClientConfig,
        method: Method,
        url: &str,
        body: Option<&RequestBody>,
        headers: Option<&HeaderMap>,
    ) -> Result<(u16, String)> {
        let authorization = normalize_bearer_authorization(&config.token);
        let caller_content_type =
            headers.is_some_and(|headers| headers.contains_key(header::CONTENT_TYPE));
        let mut attempt: u32 = 0;

        loop {
            // Each attempt gets its own timeout timer; there is no overall
            // deadline across retries.
            let mut request = self
                .http
                .request(method.clone(), url)
                .header(header::AUTHORIZATION, &authorization)
                .timeout(Duration::from_millis(config.timeout_ms));

            request = match body {
                None => request,
                Some(RequestBody::Json(value)) => request.json(value),
                Some(RequestBody::Text(text)) => {
                    let request = request.body(text.clone());
                    if caller_content_type {
                        request
                    } else {
                        request.header(header::CONTENT_TYPE, "application/json")
                    }
                }
                Some(RequestBody::Binary {
                    bytes,
                    content_type,
                }) => {
                    let request = request.body(bytes.clone());
                    match content_type {
                        Some(content_type) => request.header(header::CONTENT_TYPE, content_type),
                        None => request,
                    }
                }
                Some(RequestBody::Multipart(fields)) => request.multipart(build_form(fields)?),
            };

            // Caller headers overlay last: HeaderMap keys are
            // case-insensitive and later inserts overwrite defaults.
            if let Some(headers) = headers {
                request = request.headers(headers.clone());
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    // The attempt's timeout covers the body read too: a
                    // server that sends the status line and then stalls
                    // the body classifies as a timeout, not a network
                    // failure.
                    let body = match response.text().await {
                        Ok(body) => body,
                        Err(err) => {
                            if err.is_timeout() {
                                if attempt < config.retry_attempts {
                                    self.wait_before_retry(config, attempt).await;
                                    attempt += 1;
                                    continue;
                                }
                                return Err(QuarryError::Timeout);
                            }
                            return Err(QuarryError::Network {
                                message: err.to_string(),
                            });
                        }
                    };

                    if status.is_success() {
                        return Ok((status.as_u16(), body));
                    }

                    let err = classify_status_error(status, &body);
                    if status.is_server_error() && attempt < config.retry_attempts {
                        self.wait_before_retry(config, attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
                Err(err) => {
                    if err.is_timeout() {
                        if attempt < config.retry_attempts {
                            self.wait_before_retry(config, attempt).await;
                            attempt += 1;
                            continue;
                        }
                        return Err(QuarryError::Timeout);
                    }
                    // Only connection-establishment failures (DNS, refused
                    // connections) are transient; other transport errors
                    // surface immediately.
                    if err.is_connect() && attempt < config.retry_attempts {
                        self.wait_before_retry(config, attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(QuarryError::Network {
                        message: err.to_string(),
                    });
                }
            }
        }
    }

    /// Waits before the next retry attempt.
    ///
    /// Linear backoff: the n-th retry waits `retry_delay_ms * n`.
    async fn wait_before_retry(&self, config: &ClientConfig, attempt: u32) {
        let delay_ms = config.retry_delay_ms.saturating_mul(u64::from(attempt) + 1);

        #[cfg(feature = "tracing")]
        tracing::debug!("retrying request after {} ms", delay_ms);

        sleep(Duration::from_millis(delay_ms)).await;
    }

    fn config_snapshot(&self) -> ClientConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn classify_status_error(status: StatusCode, body: &str) -> QuarryError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => QuarryError::Api {
            status: status.as_u16(),
            message: parsed.message,
            code: parsed.code,
            details: parsed.details,
        },
        Err(_) => QuarryError::Api {
            status: status.as_u16(),
            message: format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("error")
            ),
            code: None,
            details: None,
        },
    }
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::{classify_status_error, join_url, normalize_bearer_authorization, QuarryClient};
    use crate::{ErrorCode, QuarryError};
    use reqwest::StatusCode;

    #[test]
    fn join_url_strips_and_enforces_slashes() {
        assert_eq!(
            join_url("https://api.quarry.dev/", "/query"),
            "https://api.quarry.dev/query"
        );
        assert_eq!(
            join_url("https://api.quarry.dev", "query"),
            "https://api.quarry.dev/query"
        );
        assert_eq!(
            join_url("https://api.quarry.dev", "/tables/users/import"),
            "https://api.quarry.dev/tables/users/import"
        );
    }

    #[test]
    fn normalize_bearer_adds_prefix_when_missing() {
        assert_eq!(
            normalize_bearer_authorization("abc123"),
            "Bearer abc123".to_owned()
        );
    }

    #[test]
    fn normalize_bearer_keeps_existing_prefix() {
        assert_eq!(
            normalize_bearer_authorization("bEaReR abc123"),
            "bEaReR abc123".to_owned()
        );
    }

    #[test]
    fn with_base_url_overrides_default() {
        let client = QuarryClient::new("tok").with_base_url("https://example.test");
        assert_eq!(client.config().base_url, "https://example.test");
        assert_eq!(client.config().timeout_ms, 30_000);
    }

    #[test]
    fn debug_redacts_token_value() {
        let client = QuarryClient::new("secret-token");
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn classify_parses_structured_error_body() {
        let err = classify_status_error(
            StatusCode::NOT_FOUND,
            r#"{"message":"no such table","code":"NOT_FOUND"}"#,
        );
        match err {
            QuarryError::Api {
                status,
                message,
                code,
                ..
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "no such table");
                assert_eq!(code, Some(ErrorCode::NotFound));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn classify_falls_back_to_status_line_message() {
        let err = classify_status_error(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        match err {
            QuarryError::Api {
                status,
                message,
                code,
                details,
            } => {
                assert_eq!(status, 502);
                assert_eq!(message, "HTTP 502 Bad Gateway");
                assert!(code.is_none());
                assert!(details.is_none());
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
