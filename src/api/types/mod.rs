//! Data shapes mirroring the backend's JSON. Unknown fields are ignored; missing
//! required fields fail deserialization.

mod albums;
mod assets;
mod auth;
mod comments;
pub(crate) mod common;
mod faces;
mod likes;
mod people;
mod photos;
mod users;

pub use albums::{Album, AlbumCreateData, AlbumListParams, AlbumUpdateData};
pub use assets::{Asset, AssetListParams};
pub use auth::{LoginRequest, LoginResponse, ProfileResponse, SessionUser};
pub use comments::{Comment, CommentCreateData, CommentListParams, CommentUpdateData};
pub use common::{ApiErrorBody, MessageResponse, Paginated, PaginationParams, ValidationError};
pub use faces::{
    CandidateParams, Face, FaceAssignData, FaceBulkConfirmData, FaceBulkConfirmResponse, FaceCandidate,
    FaceManualCreateData, FaceUnassignData,
};
pub use likes::{Like, LikeCreateData, LikeListParams, LikedPhotosParams};
pub use people::{Person, PersonCreateData, PersonListParams, PersonUpdateData};
pub use photos::{GeoPoint, Photo, PhotoMetadata};
pub use users::{User, UserCreateData, UserListParams, UserUpdateData};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn album_tolerates_extra_fields_and_requires_timestamps() {
        let a: Album = serde_json::from_value(json!({
            "id": "a1", "title": "Summer", "photo_count": 12,
            "created_at": "2024-06-01T10:00:00Z", "updated_at": "2024-06-02T10:00:00+02:00",
            "something_new": {"nested": true}
        })).unwrap();
        assert_eq!(a.display_title(), "Summer");
        assert_eq!(a.photo_count, Some(12));

        let missing = serde_json::from_value::<Album>(json!({"id": "a1", "title": "x"}));
        assert!(missing.is_err());
    }

    #[test]
    fn session_user_accepts_numeric_id() {
        let u: SessionUser = serde_json::from_value(json!({"id": 7, "username": "ana", "email": "a@x", "is_admin": true})).unwrap();
        assert_eq!(u.id, "7");
        assert!(u.is_admin);
        let u: SessionUser = serde_json::from_value(json!({"id": "u-1", "username": "bo"})).unwrap();
        assert_eq!(u.id, "u-1");
        assert_eq!(u.email, "");
    }

    #[test]
    fn asset_with_faces() {
        let a: Asset = serde_json::from_value(json!({
            "id": "as1", "filename": "IMG_1.jpg",
            "created_at": "2024-06-01T10:00:00Z", "updated_at": "2024-06-01T10:00:00Z",
            "taken_at": null,
            "faces": [{"id": "f1", "asset": "as1", "x": 0.1, "y": 0.2, "w": 0.3, "h": 0.4,
                       "created_at": "2024-06-01T10:00:00Z", "updated_at": "2024-06-01T10:00:00Z"}]
        })).unwrap();
        assert_eq!(a.faces.len(), 1);
        assert!(a.taken_at.is_none());
        assert!(a.tags.is_empty());
    }

    #[test]
    fn update_payloads_skip_unset_fields() {
        let v = serde_json::to_value(AlbumUpdateData { title: Some("New".into()), ..Default::default() }).unwrap();
        assert_eq!(v, json!({"title": "New"}));
    }
}
