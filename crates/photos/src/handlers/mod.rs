//! HTTP request handlers for the photos API.

pub mod photos;
pub mod stats;

// Re-export handlers from submodules (including utoipa __path types for OpenAPI)
pub use photos::{
    __path_get_all_photos, __path_get_photo, __path_get_workspace_photos, get_all_photos,
    get_photo, get_workspace_photos,
};
pub use stats::{__path_health_check, health_check};
