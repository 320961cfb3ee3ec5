use crate::api::client::{ApiClient, ApiResponse};
use crate::api::types::{
    CandidateParams, Face, FaceAssignData, FaceBulkConfirmData, FaceBulkConfirmResponse, FaceManualCreateData,
    FaceUnassignData, MessageResponse, Paginated,
};

#[derive(Debug, Clone)]
pub struct FacesApi {
    client: ApiClient,
}

impl FacesApi {
    pub fn new(client: ApiClient) -> Self { Self { client } }

    /// Unconfirmed faces the backend thinks belong to `person_id`.
    pub async fn candidates(&self, person_id: &str, params: Option<&CandidateParams>) -> ApiResponse<Paginated<Face>> {
        self.client.get_with(&format!("/api/people/{}/candidate-faces/", person_id), params).await
    }

    pub async fn bulk_confirm(&self, data: &FaceBulkConfirmData) -> ApiResponse<FaceBulkConfirmResponse> {
        self.client.post("/api/people/faces/bulk-confirm/", Some(data)).await
    }

    pub async fn assign(&self, data: &FaceAssignData) -> ApiResponse<MessageResponse> {
        self.client.post("/api/people/faces/assign/", Some(data)).await
    }

    pub async fn unassign(&self, data: &FaceUnassignData) -> ApiResponse<MessageResponse> {
        self.client.post("/api/people/faces/unassign/", Some(data)).await
    }

    pub async fn manual_create(&self, data: &FaceManualCreateData) -> ApiResponse<Face> {
        self.client.post("/api/people/faces/manual-create/", Some(data)).await
    }

    pub async fn get(&self, face_id: &str) -> ApiResponse<Face> {
        self.client.get(&format!("/api/people/faces/{}/", face_id)).await
    }
}
