use serde::{Deserialize, Serialize};

use crate::api::client::{ApiClient, ApiResponse};
use crate::api::types::Asset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeopleMode {
    All,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Shared,
    Private,
}

/// Free-text (semantic) query plus filters. With no `q` the backend filters only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    /// Comma-separated person ids.
    pub people: Option<String>,
    pub people_mode: Option<PeopleMode>,
    /// Comma-separated album ids.
    pub albums: Option<String>,
    /// `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// `YYYY-MM-DD`
    pub end_date: Option<String>,
    pub visibility: Option<Visibility>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl SearchParams {
    pub fn query(q: impl Into<String>) -> Self { Self { q: Some(q.into()), ..Default::default() } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub results: Vec<Asset>,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct SearchApi {
    client: ApiClient,
}

impl SearchApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub async fn search(&self, params: &SearchParams) -> ApiResponse<SearchResult> {
        self.client.get_with("/api/metadata/search/", Some(params)).await
    }
}
