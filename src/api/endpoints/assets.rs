use crate::api::client::{ApiClient, ApiResponse, NoContent};
use crate::api::types::{Asset, AssetListParams, Paginated};

#[derive(Debug, Clone)]
pub struct AssetsApi {
    client: ApiClient,
}

impl AssetsApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub async fn list(&self, params: Option<&AssetListParams>) -> ApiResponse<Paginated<Asset>> {
        self.client.get_with("/api/assets/", params).await
    }

    pub async fn get(&self, id: &str) -> ApiResponse<Asset> {
        self.client.get(&format!("/api/assets/{}/", id)).await
    }

    pub async fn delete(&self, id: &str) -> ApiResponse<NoContent> {
        self.client.delete(&format!("/api/assets/{}/", id)).await
    }
}
