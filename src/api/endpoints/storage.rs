use serde::{Deserialize, Serialize};

use crate::api::client::{ApiClient, ApiResponse};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStatus {
    pub configured: bool,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSetupData {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSetupResponse {
    pub success: bool,
    pub path: String,
    pub message: String,
}

/// Body of a rejected storage setup, found in `ApiResponse::error_body`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSetupError {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub current_path: Option<String>,
    #[serde(default)]
    pub requested_path: Option<String>,
    #[serde(default)]
    pub asset_count: Option<u64>,
}

impl StorageSetupError {
    pub fn from_response<T>(resp: &ApiResponse<T>) -> Option<Self> {
        resp.error_body.as_ref().and_then(|b| serde_json::from_value(b.clone()).ok())
    }
}

#[derive(Debug, Clone)]
pub struct StorageApi {
    client: ApiClient,
}

impl StorageApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub async fn status(&self) -> ApiResponse<StorageStatus> {
        self.client.get("/api/assets/storage/status/").await
    }

    /// Creates the storage backend and its directory layout at `data.path`.
    pub async fn setup(&self, data: &StorageSetupData) -> ApiResponse<StorageSetupResponse> {
        self.client.post("/api/assets/storage/setup/", Some(data)).await
    }
}
