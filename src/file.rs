use serde::Deserialize;

use crate::{FormField, QuarryClient, ResponseEnvelope, Result};

/// File metadata returned after an upload.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FileInfo {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// File upload service. Obtained via [`QuarryClient::files`].
#[derive(Clone, Copy, Debug)]
pub struct Files<'a> {
    client: &'a QuarryClient,
}

impl<'a> Files<'a> {
    pub(crate) fn new(client: &'a QuarryClient) -> Self {
        Self { client }
    }

    /// Uploads a file as a multipart form under the given field name.
    ///
    /// The part-level content type is optional; the form's own content
    /// type (with boundary) is set by the transport layer.
    pub async fn upload(
        &self,
        name: &str,
        filename: &str,
        bytes: Vec<u8>,
        content_type: Option<String>,
    ) -> Result<ResponseEnvelope<FileInfo>> {
        let fields = vec![FormField::file(name, filename, bytes, content_type)];
        self.client.post_multipart("/files", fields).await
    }
}
