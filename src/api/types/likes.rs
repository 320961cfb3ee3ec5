use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: String,
    pub asset: String,
    pub user: i64,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_username: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeCreateData {
    pub asset: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeListParams {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
    pub asset: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikedPhotosParams {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}
