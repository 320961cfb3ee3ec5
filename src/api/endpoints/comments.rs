use crate::api::client::{ApiClient, ApiResponse, NoContent};
use crate::api::types::{Comment, CommentCreateData, CommentListParams, CommentUpdateData, Paginated};

#[derive(Debug, Clone)]
pub struct CommentsApi {
    client: ApiClient,
}

impl CommentsApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub async fn list(&self, params: Option<&CommentListParams>) -> ApiResponse<Paginated<Comment>> {
        self.client.get_with("/api/assets/comments/", params).await
    }

    pub async fn get(&self, id: &str) -> ApiResponse<Comment> {
        self.client.get(&format!("/api/assets/comments/{}/", id)).await
    }

    pub async fn create(&self, data: &CommentCreateData) -> ApiResponse<Comment> {
        self.client.post("/api/assets/comments/", Some(data)).await
    }

    pub async fn update(&self, id: &str, data: &CommentUpdateData) -> ApiResponse<Comment> {
        self.client.patch(&format!("/api/assets/comments/{}/", id), Some(data)).await
    }

    pub async fn delete(&self, id: &str) -> ApiResponse<NoContent> {
        self.client.delete(&format!("/api/assets/comments/{}/", id)).await
    }
}
