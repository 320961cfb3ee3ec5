use crate::api::client::{ApiClient, ApiResponse, NoContent};
use crate::api::types::{LoginRequest, LoginResponse, ProfileResponse};

/// Token authentication endpoints, driven by the session store.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub async fn login(&self, credentials: &LoginRequest) -> ApiResponse<LoginResponse> {
        self.client.post("/api/auth/login/", Some(credentials)).await
    }

    pub async fn logout(&self) -> ApiResponse<NoContent> {
        self.client.post("/api/auth/logout/", Some(&serde_json::json!({}))).await
    }

    pub async fn me(&self) -> ApiResponse<ProfileResponse> {
        self.client.get("/api/auth/me/").await
    }
}
