//! Ad-hoc endpoints that have no dedicated module yet.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::client::{ApiClient, ApiResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl std::str::FromStr for EndpointMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(EndpointMethod::Get),
            "post" => Ok(EndpointMethod::Post),
            "put" => Ok(EndpointMethod::Put),
            "patch" => Ok(EndpointMethod::Patch),
            "delete" => Ok(EndpointMethod::Delete),
            other => Err(format!("Unsupported method: {}", other)),
        }
    }
}

/// A bound (method, path) pair, callable any number of times.
#[derive(Debug, Clone)]
pub struct DynamicEndpoint {
    client: ApiClient,
    method: EndpointMethod,
    path: String,
}

impl DynamicEndpoint {
    pub fn method(&self) -> EndpointMethod { self.method }
    pub fn path(&self) -> &str { &self.path }

    /// GET sends `params`, or `data` as the query when no params are given; the other
    /// verbs send `data` as the JSON body and ignore `params`.
    pub async fn call<T: DeserializeOwned>(&self, data: Option<&Value>, params: Option<&Value>) -> ApiResponse<T> {
        match self.method {
            EndpointMethod::Get => self.client.get_with(&self.path, params.or(data)).await,
            EndpointMethod::Post => self.client.post(&self.path, data).await,
            EndpointMethod::Put => self.client.put(&self.path, data).await,
            EndpointMethod::Patch => self.client.patch(&self.path, data).await,
            EndpointMethod::Delete => self.client.delete(&self.path).await,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UtilsApi {
    client: ApiClient,
}

impl UtilsApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub fn endpoint(&self, method: EndpointMethod, path: impl Into<String>) -> DynamicEndpoint {
        DynamicEndpoint { client: self.client.clone(), method, path: path.into() }
    }
}
