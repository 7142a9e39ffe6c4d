use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{HeaderMap, QuarryClient, ResponseEnvelope, Result};

/// Column definition sent when creating a table. No client-side schema
/// validation; the platform rejects invalid definitions.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
}

impl TableColumn {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
}

/// Table metadata returned by the platform.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TableInfo {
    pub name: String,
    #[serde(default)]
    pub row_count: Option<u64>,
}

/// Result of a CSV import.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ImportResult {
    #[serde(default)]
    pub rows_imported: u64,
}

/// Table management service. Obtained via [`QuarryClient::tables`].
#[derive(Clone, Copy, Debug)]
pub struct Tables<'a> {
    client: &'a QuarryClient,
}

impl<'a> Tables<'a> {
    pub(crate) fn new(client: &'a QuarryClient) -> Self {
        Self { client }
    }

    /// Creates a table with the given columns.
    pub async fn create(
        &self,
        name: &str,
        columns: &[TableColumn],
    ) -> Result<ResponseEnvelope<TableInfo>> {
        self.client
            .post_json("/tables", &json!({ "name": name, "columns": columns }))
            .await
    }

    /// Lists all tables.
    pub async fn list(&self) -> Result<ResponseEnvelope<Vec<TableInfo>>> {
        self.client.get("/tables").await
    }

    /// Drops a table.
    pub async fn drop(&self, name: &str) -> Result<ResponseEnvelope<serde_json::Value>> {
        self.client.delete(&format!("/tables/{name}")).await
    }

    /// Imports CSV text into an existing table.
    ///
    /// The CSV is sent as a raw text body with `Content-Type: text/csv`;
    /// the content is not parsed or validated client-side.
    pub async fn import_csv(
        &self,
        name: &str,
        csv: impl Into<String>,
    ) -> Result<ResponseEnvelope<ImportResult>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        self.client
            .post_text(&format!("/tables/{name}/import"), csv, Some(headers))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::TableColumn;

    #[test]
    fn column_serializes_type_under_wire_name() {
        let column = TableColumn::new("id", "integer");
        let json = serde_json::to_value(&column).expect("must serialize");
        assert_eq!(json, serde_json::json!({"name": "id", "type": "integer"}));
    }
}
