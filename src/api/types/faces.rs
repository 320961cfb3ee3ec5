use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A detected or manually drawn face. The box is normalized to 0..1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub id: String,
    pub asset: String,
    #[serde(default)]
    pub person: Option<String>,
    #[serde(default)]
    pub person_name: Option<String>,
    #[serde(default)]
    pub person_headshot_url: Option<String>,

    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,

    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,

    #[serde(default)]
    pub confirmed: Option<bool>,
    #[serde(default)]
    pub confirmed_by: Option<String>,
    #[serde(default)]
    pub confirmed_by_username: Option<String>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceAssignData {
    pub face_ids: Vec<String>,
    pub person_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceUnassignData {
    pub face_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceManualCreateData {
    pub asset_id: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceCandidate {
    pub person_id: String,
    pub person_name: String,
    pub confidence: f64,
    #[serde(default)]
    pub headshot_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBulkConfirmData {
    pub face_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceBulkConfirmResponse {
    pub updated: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}
