use std::collections::HashMap;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::client::{ApiClient, ApiResponse};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailUrls {
    #[serde(default)]
    pub sm: Option<String>,
    #[serde(default)]
    pub md: Option<String>,
    #[serde(default)]
    pub lg: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadFileResponse {
    pub id: String,
    pub sha256: String,
    pub storage_url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub mime_type: String,
    #[serde(default)]
    pub taken_at: Option<String>,
    #[serde(default)]
    pub thumbnail_urls: Option<ThumbnailUrls>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl UploadMetadata {
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map(str::is_empty).unwrap_or(true);
        blank(&self.taken_at) && blank(&self.description) && blank(&self.caption)
    }

    /// Drops empty strings so they are not sent.
    pub fn compact(&self) -> Self {
        let keep = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        Self { taken_at: keep(&self.taken_at), description: keep(&self.description), caption: keep(&self.caption) }
    }
}

/// In-memory file ready for multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSource {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadSource {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), mime_type: mime_type.into(), bytes }
    }

    pub(crate) fn to_form(&self, metadata: Option<&UploadMetadata>) -> Result<Form, String> {
        let part = Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.mime_type)
            .map_err(|e| format!("invalid mime type '{}': {}", self.mime_type, e))?;
        let mut form = Form::new().part("file", part);
        if let Some(meta) = metadata.filter(|m| !m.is_empty()) {
            let json = serde_json::to_string(&meta.compact()).map_err(|e| e.to_string())?;
            form = form.text("metadata", json);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone)]
pub struct UploadApi {
    client: ApiClient,
}

impl UploadApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    /// Direct upload into the backend's local filesystem storage.
    pub async fn upload_file(&self, form: Form) -> ApiResponse<UploadFileResponse> {
        self.client.upload("/api/assets/upload_file/", form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_emptiness_ignores_blank_strings() {
        assert!(UploadMetadata::default().is_empty());
        let m = UploadMetadata { caption: Some(String::new()), ..Default::default() };
        assert!(m.is_empty());
        let m = UploadMetadata { caption: Some("Grandma".into()), description: Some(String::new()), ..Default::default() };
        assert!(!m.is_empty());
        assert_eq!(serde_json::to_value(m.compact()).unwrap(), serde_json::json!({"caption": "Grandma"}));
    }

    #[test]
    fn bad_mime_is_reported() {
        let src = UploadSource::new("a.jpg", "not a mime type", vec![1, 2, 3]);
        assert!(src.to_form(None).is_err());
    }
}
