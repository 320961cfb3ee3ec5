//! Typed access to the OpenPhotobox REST backend.
//! `ApiClient` is the shared transport; `Api` bundles every endpoint module over one
//! client and is built once per application (see `AppContext`).

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{encode_query, ApiClient, ApiResponse, NoContent, TokenSource};
pub use endpoints::*;

#[derive(Debug, Clone)]
pub struct Api {
    pub client: ApiClient,
    pub auth: AuthApi,
    pub assets: AssetsApi,
    pub albums: AlbumsApi,
    pub people: PeopleApi,
    pub faces: FacesApi,
    pub utils: UtilsApi,
    pub setup: SetupApi,
    pub storage: StorageApi,
    pub upload: UploadApi,
    pub users: UsersApi,
    pub comments: CommentsApi,
    pub likes: LikesApi,
    pub search: SearchApi,
}

impl Api {
    pub fn new(client: ApiClient) -> Self {
        Self {
            auth: AuthApi::new(client.clone()),
            assets: AssetsApi::new(client.clone()),
            albums: AlbumsApi::new(client.clone()),
            people: PeopleApi::new(client.clone()),
            faces: FacesApi::new(client.clone()),
            utils: UtilsApi::new(client.clone()),
            setup: SetupApi::new(client.clone()),
            storage: StorageApi::new(client.clone()),
            upload: UploadApi::new(client.clone()),
            users: UsersApi::new(client.clone()),
            comments: CommentsApi::new(client.clone()),
            likes: LikesApi::new(client.clone()),
            search: SearchApi::new(client.clone()),
            client,
        }
    }
}
