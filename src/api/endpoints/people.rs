use crate::api::client::{ApiClient, ApiResponse, NoContent};
use crate::api::types::{Paginated, Person, PersonCreateData, PersonListParams, PersonUpdateData};

#[derive(Debug, Clone)]
pub struct PeopleApi {
    client: ApiClient,
}

impl PeopleApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    pub async fn list(&self, params: Option<&PersonListParams>) -> ApiResponse<Paginated<Person>> {
        self.client.get_with("/api/people/", params).await
    }

    pub async fn get(&self, id: &str) -> ApiResponse<Person> {
        self.client.get(&format!("/api/people/{}/", id)).await
    }

    pub async fn create(&self, data: &PersonCreateData) -> ApiResponse<Person> {
        self.client.post("/api/people/", Some(data)).await
    }

    pub async fn update(&self, id: &str, data: &PersonUpdateData) -> ApiResponse<Person> {
        self.client.patch(&format!("/api/people/{}/", id), Some(data)).await
    }

    pub async fn delete(&self, id: &str) -> ApiResponse<NoContent> {
        self.client.delete(&format!("/api/people/{}/", id)).await
    }
}
