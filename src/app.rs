use serde::de::DeserializeOwned;

use crate::{QuarryClient, ResponseEnvelope, Result};

/// App invocation service. Obtained via [`QuarryClient::apps`].
#[derive(Clone, Copy, Debug)]
pub struct Apps<'a> {
    client: &'a QuarryClient,
}

impl<'a> Apps<'a> {
    pub(crate) fn new(client: &'a QuarryClient) -> Self {
        Self { client }
    }

    /// Invokes an app with a JSON payload and decodes its result.
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        app_id: &str,
        payload: &impl serde::Serialize,
    ) -> Result<ResponseEnvelope<T>> {
        self.client
            .post_json(&format!("/apps/{app_id}/invoke"), payload)
            .await
    }
}
