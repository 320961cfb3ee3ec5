use serde_json::Value;

use crate::api::client::{ApiClient, ApiResponse, NoContent};
use crate::api::types::{Like, LikeCreateData, LikeListParams, LikedPhotosParams, Paginated};

#[derive(Debug, Clone)]
pub struct LikesApi {
    client: ApiClient,
}

impl LikesApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub async fn list(&self, params: Option<&LikeListParams>) -> ApiResponse<Paginated<Like>> {
        self.client.get_with("/api/assets/likes/", params).await
    }

    pub async fn get(&self, id: &str) -> ApiResponse<Like> {
        self.client.get(&format!("/api/assets/likes/{}/", id)).await
    }

    pub async fn create(&self, data: &LikeCreateData) -> ApiResponse<Like> {
        self.client.post("/api/assets/likes/", Some(data)).await
    }

    pub async fn delete(&self, id: &str) -> ApiResponse<NoContent> {
        self.client.delete(&format!("/api/assets/likes/{}/", id)).await
    }

    /// Assets liked by the current user. The envelope differs between backend
    /// versions, so it is returned untyped.
    pub async fn liked_photos(&self, params: Option<&LikedPhotosParams>) -> ApiResponse<Value> {
        self.client.get_with("/api/assets/liked/", params).await
    }
}
