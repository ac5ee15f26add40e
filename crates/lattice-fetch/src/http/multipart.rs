//! Multipart form payloads for uploads.

use std::path::Path;

use bytes::Bytes;

use crate::error::{RequestError, Result};
use crate::targets;

/// A file attached to a multipart form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormFile {
    /// Raw file contents.
    pub bytes: Bytes,
    /// File name reported to the server.
    pub file_name: Option<String>,
    /// MIME type of the part.
    pub mime_type: Option<String>,
}

impl FormFile {
    /// Create a file part from raw bytes.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
            file_name: None,
            mime_type: None,
        }
    }

    /// Read a file from disk. The file name is taken from the path.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RequestError::Io(format!("{}: {e}", path.display())))?;
        let file_name = path.file_name().map(|name| name.to_string_lossy().into_owned());
        Ok(Self {
            bytes: bytes.into(),
            file_name,
            mime_type: None,
        })
    }

    /// Set the file name.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Set the MIME type.
    pub fn mime_type(mut self, mime: impl Into<String>) -> Self {
        self.mime_type = Some(mime.into());
        self
    }

    fn into_part(self) -> reqwest::multipart::Part {
        let mut part = reqwest::multipart::Part::stream(self.bytes.clone());
        if let Some(name) = &self.file_name {
            part = part.file_name(name.clone());
        }
        match self.mime_type {
            Some(mime) => part.mime_str(&mime).unwrap_or_else(|e| {
                tracing::warn!(target: targets::HTTP, "Invalid MIME type '{}': {}", mime, e);
                // mime_str consumed the part, rebuild it without the type
                let part = reqwest::multipart::Part::stream(self.bytes);
                match self.file_name {
                    Some(name) => part.file_name(name),
                    None => part,
                }
            }),
            None => part,
        }
    }
}

/// The value of one multipart field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormValue {
    /// A plain text field.
    Text(String),
    /// A file field.
    File(FormFile),
}

/// Multipart form data.
///
/// Unlike a transport-level form this is plain data: it can be cloned,
/// inspected by interceptors, and kept in the [`RequestConfig`](super::RequestConfig)
/// attached to a response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartForm {
    fields: Vec<(String, FormValue)>,
}

impl MultipartForm {
    /// Create a new empty multipart form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field to the form.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FormValue::Text(value.into())));
        self
    }

    /// Add a file field.
    pub fn file(mut self, name: impl Into<String>, file: FormFile) -> Self {
        self.fields.push((name.into(), FormValue::File(file)));
        self
    }

    /// Add a file field from bytes.
    pub fn file_bytes(
        self,
        name: impl Into<String>,
        bytes: impl Into<Bytes>,
        filename: impl Into<String>,
        mime_type: Option<&str>,
    ) -> Self {
        let mut file = FormFile::new(bytes).file_name(filename);
        file.mime_type = mime_type.map(str::to_string);
        self.file(name, file)
    }

    /// The fields in insertion order.
    pub fn fields(&self) -> &[(String, FormValue)] {
        &self.fields
    }

    /// The first field with the given name.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the form has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert to a reqwest form. reqwest picks the boundary.
    pub(crate) fn into_reqwest(self) -> reqwest::multipart::Form {
        self.fields
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (name, value)| match value {
                FormValue::Text(text) => form.text(name, text),
                FormValue::File(file) => form.part(name, file.into_part()),
            })
    }
}
