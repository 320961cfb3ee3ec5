use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::faces::Face;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub storage_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub taken_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub faces: Vec<Face>,
    #[serde(default)]
    pub albums: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub exif_data: Option<HashMap<String, Value>>,

    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetListParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub cursor: Option<String>,
    pub ordering: Option<String>,
    pub search: Option<String>,
    pub person_id: Option<String>,
    pub album_id: Option<String>,
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub has_faces: Option<bool>,
}
