use serde::{Deserialize, Serialize};

use crate::api::client::{ApiClient, ApiResponse};
use crate::api::types::common::string_or_number;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupCheckResponse {
    pub needs_setup: bool,
    #[serde(default)]
    pub configured: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAdminData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedAdmin {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAdminResponse {
    pub user: CreatedAdmin,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct SetupApi {
    client: ApiClient,
}

impl SetupApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub async fn check(&self) -> ApiResponse<SetupCheckResponse> {
        self.client.get("/api/setup/check/").await
    }

    /// First-run only; the backend refuses once an admin exists.
    pub async fn create_admin(&self, data: &CreateAdminData) -> ApiResponse<CreateAdminResponse> {
        self.client.post("/api/setup/create-admin/", Some(data)).await
    }
}
