//! OpenPhotobox client library.
//!
//! Typed wrappers for the photo archive's REST backend plus the client-side pieces that
//! sit around them: a persisted session, navigation guards, upload and image-preload
//! helpers, and the server-sent event channel. Start from [`context::AppContext`].

pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod guards;
pub mod lazy_image;
pub mod session;
pub mod upload;

pub use api::{Api, ApiClient, ApiResponse};
pub use config::ClientConfig;
pub use context::AppContext;
pub use error::{ClientError, ClientResult};

// Test-only printing helper: expands to eprintln! during tests and debug builds.
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In release builds, a no-op that still type-checks its arguments.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        if false { let _ = format!($($arg)*); }
    });
}
