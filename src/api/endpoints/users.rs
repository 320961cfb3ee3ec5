//! Admin-only user management.

use crate::api::client::{ApiClient, ApiResponse, NoContent};
use crate::api::types::{User, UserCreateData, UserListParams, UserUpdateData};

#[derive(Debug, Clone)]
pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub async fn list(&self, params: Option<&UserListParams>) -> ApiResponse<Vec<User>> {
        self.client.get_with("/api/admin/users/", params).await
    }

    pub async fn create(&self, data: &UserCreateData) -> ApiResponse<User> {
        self.client.post("/api/admin/users/", Some(data)).await
    }

    pub async fn get(&self, user_id: i64) -> ApiResponse<User> {
        self.client.get(&format!("/api/admin/users/{}/", user_id)).await
    }

    pub async fn update(&self, user_id: i64, data: &UserUpdateData) -> ApiResponse<User> {
        self.client.patch(&format!("/api/admin/users/{}/", user_id), Some(data)).await
    }

    pub async fn delete(&self, user_id: i64) -> ApiResponse<NoContent> {
        self.client.delete(&format!("/api/admin/users/{}/delete/", user_id)).await
    }
}
