use reqwest::multipart::{Form, Part};

use crate::{QuarryError, Result};

/// Request payload variants accepted by the dispatcher.
///
/// All variants own their data so a retried attempt can rebuild the
/// transport body from scratch.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// JSON-serialized value; defaults `Content-Type: application/json`.
    Json(serde_json::Value),
    /// Raw text; defaults `Content-Type: application/json` unless the
    /// caller supplies a content type header.
    Text(String),
    /// Raw bytes with an optional explicit content type. No content type
    /// is forced when `content_type` is `None`.
    Binary {
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
    /// Multipart form. The content type (with boundary) is set by the
    /// transport layer, never by the dispatcher.
    Multipart(Vec<FormField>),
}

impl RequestBody {
    /// Convenience constructor serializing any `Serialize` value.
    pub fn json<T: serde::Serialize>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|err| QuarryError::Decode(format!("unserializable JSON body: {err}")))?;
        Ok(RequestBody::Json(value))
    }
}

/// One field of a multipart form.
#[derive(Clone, Debug, PartialEq)]
pub struct FormField {
    pub name: String,
    pub part: FormPart,
}

impl FormField {
    /// Plain text form field.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            part: FormPart::Text(value.into()),
        }
    }

    /// File form field with an optional part-level content type.
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        bytes: Vec<u8>,
        content_type: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            part: FormPart::File {
                filename: filename.into(),
                bytes,
                content_type,
            },
        }
    }
}

/// Value of a multipart form field.
#[derive(Clone, Debug, PartialEq)]
pub enum FormPart {
    Text(String),
    File {
        filename: String,
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
}

/// Builds a transport form from owned fields. Called once per attempt:
/// `reqwest::multipart::Form` is not reusable across sends.
pub(crate) fn build_form(fields: &[FormField]) -> Result<Form> {
    let mut form = Form::new();
    for field in fields {
        let part = match &field.part {
            FormPart::Text(value) => Part::text(value.clone()),
            FormPart::File {
                filename,
                bytes,
                content_type,
            } => {
                let mut part = Part::bytes(bytes.clone()).file_name(filename.clone());
                if let Some(content_type) = content_type {
                    part = part.mime_str(content_type).map_err(|err| {
                        QuarryError::Decode(format!(
                            "invalid multipart content type '{content_type}': {err}"
                        ))
                    })?;
                }
                part
            }
        };
        form = form.part(field.name.clone(), part);
    }
    Ok(form)
}
