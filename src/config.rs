use std::fmt;

/// Default base address of the Quarry platform API.
pub const DEFAULT_BASE_URL: &str = "https://api.quarry.dev";

/// Configures authentication, endpoint, timeout and retry behavior.
///
/// Immutable during a dispatch: the client snapshots the configuration at
/// the start of every call, so an update between two calls affects only
/// calls issued after it.
#[derive(Clone, Eq, PartialEq)]
pub struct ClientConfig {
    /// Access token sent as `Authorization: Bearer <token>`.
    pub token: String,
    /// Base address of the platform API, without a trailing slash.
    pub base_url: String,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub retry_attempts: u32,
    /// Base retry delay in milliseconds (linear backoff: 1x, 2x, 3x, ...).
    pub retry_delay_ms: u64,
}

impl ClientConfig {
    /// Creates a configuration with the given token and default settings.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_ms: 30_000,
            retry_attempts: 3,
            retry_delay_ms: 1_000,
        }
    }

    /// Sets the base address.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-attempt timeout in milliseconds.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the maximum number of retries after the initial attempt.
    pub fn with_retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    /// Sets the base retry delay in milliseconds.
    pub fn with_retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Applies a partial update: set fields overwrite, unset fields keep
    /// their current value. The schema is fixed, so the merge is an
    /// exhaustive field-by-field assignment rather than a generic deep
    /// merge.
    pub fn merge(&mut self, update: ConfigUpdate) {
        let ConfigUpdate {
            token,
            base_url,
            timeout_ms,
            retry_attempts,
            retry_delay_ms,
        } = update;

        if let Some(token) = token {
            self.token = token;
        }
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if let Some(timeout_ms) = timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(retry_attempts) = retry_attempts {
            self.retry_attempts = retry_attempts;
        }
        if let Some(retry_delay_ms) = retry_delay_ms {
            self.retry_delay_ms = retry_delay_ms;
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("retry_attempts", &self.retry_attempts)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

/// Partial configuration applied with [`ClientConfig::merge`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConfigUpdate {
    pub token: Option<String>,
    pub base_url: Option<String>,
    pub timeout_ms: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

impl ConfigUpdate {
    /// Sets the token to apply.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the base address to apply.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the timeout to apply.
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Sets the retry count to apply.
    pub fn retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = Some(retry_attempts);
        self
    }

    /// Sets the base retry delay to apply.
    pub fn retry_delay_ms(mut self, retry_delay_ms: u64) -> Self {
        self.retry_delay_ms = Some(retry_delay_ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, ConfigUpdate, DEFAULT_BASE_URL};

    #[test]
    fn defaults() {
        let config = ClientConfig::new("tok");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay_ms, 1_000);
    }

    #[test]
    fn merge_overwrites_set_fields_only() {
        let mut config = ClientConfig::new("tok").with_base_url("https://example.test");
        config.merge(
            ConfigUpdate::default()
                .timeout_ms(5_000)
                .retry_attempts(1),
        );

        assert_eq!(config.token, "tok");
        assert_eq!(config.base_url, "https://example.test");
        assert_eq!(config.timeout_ms, 5_000);
        assert_eq!(config.retry_attempts, 1);
        assert_eq!(config.retry_delay_ms, 1_000);
    }

    #[test]
    fn merge_empty_update_is_noop() {
        let mut config = ClientConfig::new("tok");
        let before = config.clone();
        config.merge(ConfigUpdate::default());
        assert_eq!(config, before);
    }

    #[test]
    fn debug_redacts_token() {
        let config = ClientConfig::new("secret-token");
        let debug = format!("{config:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }
}
