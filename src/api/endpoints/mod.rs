//! One module per backend resource. Each operation is a single transport call with a
//! fixed path; errors are whatever the transport reports.

mod albums;
mod assets;
mod auth;
mod comments;
mod faces;
mod likes;
mod people;
mod search;
mod setup;
mod storage;
mod upload;
mod users;
mod utils;

pub use albums::AlbumsApi;
pub use assets::AssetsApi;
pub use auth::AuthApi;
pub use comments::CommentsApi;
pub use faces::FacesApi;
pub use likes::LikesApi;
pub use people::PeopleApi;
pub use search::{PeopleMode, SearchApi, SearchParams, SearchResult, Visibility};
pub use setup::{CreateAdminData, CreateAdminResponse, CreatedAdmin, SetupApi, SetupCheckResponse};
pub use storage::{StorageApi, StorageSetupData, StorageSetupError, StorageSetupResponse, StorageStatus};
pub use upload::{ThumbnailUrls, UploadApi, UploadFileResponse, UploadMetadata, UploadSource};
pub use users::UsersApi;
pub use utils::{DynamicEndpoint, EndpointMethod, UtilsApi};
