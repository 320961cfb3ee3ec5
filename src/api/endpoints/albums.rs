use serde_json::json;

use crate::api::client::{ApiClient, ApiResponse, NoContent};
use crate::api::types::{Album, AlbumCreateData, AlbumListParams, AlbumUpdateData, MessageResponse, Paginated};

#[derive(Debug, Clone)]
pub struct AlbumsApi {
    client: ApiClient,
}

impl AlbumsApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub async fn create(&self, data: &AlbumCreateData) -> ApiResponse<Album> {
        self.client.post("/api/albums/", Some(data)).await
    }

    pub async fn list(&self, params: Option<&AlbumListParams>) -> ApiResponse<Paginated<Album>> {
        self.client.get_with("/api/albums/", params).await
    }

    pub async fn get(&self, id: &str) -> ApiResponse<Album> {
        self.client.get(&format!("/api/albums/{}/", id)).await
    }

    pub async fn update(&self, id: &str, data: &AlbumUpdateData) -> ApiResponse<Album> {
        self.client.patch(&format!("/api/albums/{}/", id), Some(data)).await
    }

    pub async fn delete(&self, id: &str) -> ApiResponse<NoContent> {
        self.client.delete(&format!("/api/albums/{}/", id)).await
    }

    pub async fn add_photos(&self, album_id: &str, asset_ids: &[String]) -> ApiResponse<MessageResponse> {
        let body = json!({ "asset_ids": asset_ids });
        self.client.post(&format!("/api/albums/{}/add_photos/", album_id), Some(&body)).await
    }
}
