//! Upload workflow on top of the raw upload endpoint: storage pre-check, per-file
//! progress milestones and concurrent multi-file uploads.
//!
//! Progress values are fixed milestones (10 = started, 30 = request prepared,
//! 100 = stored), not byte counts.

use std::path::Path;

use chrono::Utc;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{error, info};

use crate::api::{StorageApi, UploadApi, UploadMetadata, UploadSource};
use crate::error::{ClientError, ClientResult};

pub const PROGRESS_STARTED: u8 = 10;
pub const PROGRESS_PREPARED: u8 = 30;
pub const PROGRESS_DONE: u8 = 100;

const MSG_NOT_CONFIGURED: &str =
    "Storage is not configured. Please configure a storage directory in Admin Settings before uploading photos.";
const MSG_CHECK_FAILED: &str = "Unable to check storage configuration.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Processing,
    Completed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadItem {
    pub id: String,
    pub file_name: String,
    pub progress: u8,
    pub status: UploadStatus,
    pub error: Option<String>,
    pub asset_id: Option<String>,
}

/// Per-file notifications from [`SmartUpload::upload_files`]. All methods default to no-ops.
pub trait UploadObserver: Send + Sync {
    fn on_progress(&self, _id: &str, _progress: u8) {}
    fn on_complete(&self, _id: &str, _asset_id: &str) {}
    fn on_error(&self, _id: &str, _error: &str) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl UploadObserver for SilentObserver {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageCheck {
    pub configured: bool,
    pub message: Option<String>,
}

impl UploadSource {
    /// Reads a file from disk, guessing the MIME type from its extension.
    pub async fn from_path(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::storage(format!("cannot read {}: {}", path.display(), e)))?;
        let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| "upload".to_string());
        Ok(UploadSource::new(file_name, mime_for_path(path), bytes))
    }
}

pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "tif" | "tiff" => "image/tiff",
        "dng" => "image/x-adobe-dng",
        "cr2" => "image/x-canon-cr2",
        "nef" => "image/x-nikon-nef",
        "arw" => "image/x-sony-arw",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, Clone)]
pub struct SmartUpload {
    storage: StorageApi,
    upload: UploadApi,
}

impl SmartUpload {
    pub fn new(storage: StorageApi, upload: UploadApi) -> Self { Self { storage, upload } }

    /// Whether the backend has a storage directory; `message` explains a `false`.
    pub async fn check_storage_configuration(&self) -> StorageCheck {
        let resp = self.storage.status().await;
        match (resp.success, resp.data) {
            (true, Some(status)) if status.configured => StorageCheck { configured: true, message: None },
            (true, Some(_)) => StorageCheck { configured: false, message: Some(MSG_NOT_CONFIGURED.to_string()) },
            (true, None) => StorageCheck { configured: false, message: Some(MSG_CHECK_FAILED.to_string()) },
            (false, _) => StorageCheck {
                configured: false,
                message: Some(resp.error.unwrap_or_else(|| MSG_CHECK_FAILED.to_string())),
            },
        }
    }

    /// Uploads one file and returns the new asset id.
    pub async fn upload_file(
        &self,
        source: &UploadSource,
        on_progress: &(dyn Fn(u8) + Send + Sync),
        metadata: Option<&UploadMetadata>,
    ) -> ClientResult<String> {
        on_progress(PROGRESS_STARTED);
        let form = source.to_form(metadata).map_err(ClientError::decode)?;
        on_progress(PROGRESS_PREPARED);

        let resp = self.upload.upload_file(form).await;
        if let Some(err) = resp.error_or("Failed to upload file") {
            error!(target: "openphotobox::upload", "upload of '{}' failed: {}", source.file_name, err);
            return Err(err);
        }
        let Some(stored) = resp.data else {
            return Err(ClientError::decode("Failed to upload file: empty response"));
        };
        on_progress(PROGRESS_DONE);
        info!(target: "openphotobox::upload", "uploaded '{}' as asset {}", source.file_name, stored.id);
        Ok(stored.id)
    }

    /// Uploads all files concurrently. The returned items are in input order.
    pub async fn upload_files(
        &self,
        sources: Vec<UploadSource>,
        observer: &dyn UploadObserver,
        metadata: Option<&UploadMetadata>,
    ) -> Vec<UploadItem> {
        let stamp = Utc::now().timestamp_millis();
        let jobs = sources.into_iter().enumerate().map(|(index, source)| {
            let mut item = UploadItem {
                id: format!("upload-{}-{}", stamp, index),
                file_name: source.file_name.clone(),
                progress: 0,
                status: UploadStatus::Pending,
                error: None,
                asset_id: None,
            };
            async move {
                item.status = UploadStatus::Uploading;
                let id = item.id.clone();
                let last = std::sync::atomic::AtomicU8::new(0);
                let progress = |p: u8| {
                    last.store(p, std::sync::atomic::Ordering::Relaxed);
                    observer.on_progress(&id, p);
                };
                let result = self.upload_file(&source, &progress, metadata).await;
                item.progress = last.load(std::sync::atomic::Ordering::Relaxed);
                match result {
                    Ok(asset_id) => {
                        item.status = UploadStatus::Completed;
                        observer.on_complete(&item.id, &asset_id);
                        item.asset_id = Some(asset_id);
                    }
                    Err(e) => {
                        item.status = UploadStatus::Error;
                        observer.on_error(&item.id, e.message());
                        item.error = Some(e.message().to_string());
                    }
                }
                item
            }
        });
        join_all(jobs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_guessing() {
        assert_eq!(mime_for_path(Path::new("/x/IMG_0001.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("scan.tiff")), "image/tiff");
        assert_eq!(mime_for_path(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let cfg = crate::config::ClientConfig::new("http://127.0.0.1:9").unwrap();
        let client = crate::api::ApiClient::new(cfg, std::sync::Arc::new(|| None)).unwrap();
        let uploader = SmartUpload::new(StorageApi::new(client.clone()), UploadApi::new(client));
        let steps = std::sync::Mutex::new(Vec::new());
        let src = UploadSource::new("a.jpg", "image/jpeg", vec![1, 2, 3]);
        let err = uploader.upload_file(&src, &|p: u8| steps.lock().unwrap().push(p), None).await.unwrap_err();
        assert_eq!(err.code_str(), "transport");
        assert_eq!(*steps.lock().unwrap(), vec![PROGRESS_STARTED, PROGRESS_PREPARED]);
    }

    #[tokio::test]
    async fn from_path_reads_name_and_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("beach.png");
        std::fs::write(&p, [1u8, 2, 3]).unwrap();
        let src = UploadSource::from_path(&p).await.unwrap();
        assert_eq!(src.file_name, "beach.png");
        assert_eq!(src.mime_type, "image/png");
        assert_eq!(src.bytes, vec![1, 2, 3]);
        assert!(matches!(UploadSource::from_path(tmp.path().join("missing.jpg")).await, Err(ClientError::Storage { .. })));
    }
}
