mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use common::MockBackend;
use openphotobox::api::{UploadMetadata, UploadSource};
use openphotobox::upload::{UploadObserver, UploadStatus};
use parking_lot::Mutex;

#[derive(Default)]
struct Recorder {
    progress: Mutex<Vec<(String, u8)>>,
    done: Mutex<Vec<(String, String)>>,
    errors: Mutex<Vec<(String, String)>>,
}

impl UploadObserver for Recorder {
    fn on_progress(&self, id: &str, p: u8) { self.progress.lock().push((id.to_string(), p)); }
    fn on_complete(&self, id: &str, asset: &str) { self.done.lock().push((id.to_string(), asset.to_string())); }
    fn on_error(&self, id: &str, e: &str) { self.errors.lock().push((id.to_string(), e.to_string())); }
}

fn jpeg(name: &str) -> UploadSource { UploadSource::new(name, "image/jpeg", vec![0xff, 0xd8, 0xff, 0xe0]) }

#[tokio::test]
async fn single_upload_reports_milestones() {
    let mock = MockBackend::start().await;
    let (ctx, _) = mock.context();
    let uploader = ctx.uploader();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let meta = UploadMetadata { caption: Some("sunset".into()), ..Default::default() };
    let id = uploader.upload_file(&jpeg("a.jpg"), &move |p: u8| sink.lock().push(p), Some(&meta)).await.unwrap();
    assert_eq!(id, "asset-1");
    assert_eq!(*seen.lock(), vec![10, 30, 100]);
}

#[tokio::test]
async fn batch_upload_keeps_order_and_isolates_failures() {
    let mock = MockBackend::start().await;
    let (ctx, _) = mock.context();
    let rec = Recorder::default();
    let items = ctx.uploader().upload_files(vec![jpeg("a.jpg"), jpeg("broken.jpg"), jpeg("c.jpg")], &rec, None).await;

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].file_name, "a.jpg");
    assert_eq!(items[0].status, UploadStatus::Completed);
    assert_eq!(items[0].progress, 100);
    assert_eq!(items[1].status, UploadStatus::Error);
    assert_eq!(items[1].error.as_deref(), Some("disk full"));
    assert_eq!(items[1].progress, 30);
    assert!(items[2].asset_id.is_some());
    assert!(items.iter().all(|i| i.id.starts_with("upload-")));
    assert_eq!(rec.done.lock().len(), 2);
    assert_eq!(rec.errors.lock().len(), 1);
    assert_eq!(mock.state.uploads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn storage_check_explains_unconfigured_backend() {
    let mock = MockBackend::start().await;
    let (ctx, _) = mock.context();
    assert!(ctx.uploader().check_storage_configuration().await.configured);
    mock.state.storage_configured.store(false, Ordering::SeqCst);
    let check = ctx.uploader().check_storage_configuration().await;
    assert!(!check.configured);
    assert!(check.message.unwrap().starts_with("Storage is not configured"));
}
