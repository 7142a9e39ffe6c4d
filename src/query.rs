use serde::de::DeserializeOwned;
use serde_json::json;

use crate::{QuarryClient, ResponseEnvelope, Result};

/// Query execution service. Obtained via [`QuarryClient::queries`].
///
/// SQL text and parameters are passed through to the platform verbatim;
/// the caller chooses the row type to decode into.
#[derive(Clone, Copy, Debug)]
pub struct Queries<'a> {
    client: &'a QuarryClient,
}

impl<'a> Queries<'a> {
    pub(crate) fn new(client: &'a QuarryClient) -> Self {
        Self { client }
    }

    /// Executes a SQL statement.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn run() -> quarry_http::Result<()> {
    /// use quarry_http::QuarryClient;
    ///
    /// let client = QuarryClient::new("token");
    /// let rows: quarry_http::ResponseEnvelope<Vec<serde_json::Value>> =
    ///     client.queries().execute("SELECT * FROM users").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute<T: DeserializeOwned>(&self, sql: &str) -> Result<ResponseEnvelope<T>> {
        self.client.post_json("/query", &json!({ "sql": sql })).await
    }

    /// Executes a SQL statement with bound parameters.
    pub async fn execute_with_params<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: serde_json::Value,
    ) -> Result<ResponseEnvelope<T>> {
        self.client
            .post_json("/query", &json!({ "sql": sql, "params": params }))
            .await
    }
}
