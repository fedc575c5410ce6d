//! Photo read handlers.

use axum::{
    Extension,
    extract::Path,
    response::Json,
};

use crate::{errors::AppError, models::Photo, store::SharedStore};

/// List stored photos.
#[utoipa::path(
    get,
    path = "/api/photos",
    tag = "photos",
    responses(
        (status = 200, description = "List of photos", body = Vec<Photo>)
    )
)]
pub async fn get_all_photos(
    Extension(store): Extension<SharedStore>,
) -> Result<Json<Vec<Photo>>, AppError> {
    let photos = store.all_photos().await?;
    Ok(Json(photos))
}

/// Get a photo by ID.
#[utoipa::path(
    get,
    path = "/api/photos/{id}",
    tag = "photos",
    params(
        ("id" = String, Path, description = "Photo ID")
    ),
    responses(
        (status = 200, description = "Photo found", body = Photo),
        (status = 400, description = "Malformed photo ID"),
        (status = 404, description = "Photo not found")
    )
)]
pub async fn get_photo(
    Extension(store): Extension<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<Photo>, AppError> {
    let photo = store.photo_by_id(&id).await?.ok_or(AppError::NotFound)?;
    Ok(Json(photo))
}

/// List the photos of one workspace.
#[utoipa::path(
    get,
    path = "/api/photos/workspace/{workspace_id}",
    tag = "photos",
    params(
        ("workspace_id" = String, Path, description = "Workspace ID")
    ),
    responses(
        (status = 200, description = "Photos of the workspace", body = Vec<Photo>),
        (status = 400, description = "Malformed workspace ID")
    )
)]
pub async fn get_workspace_photos(
    Extension(store): Extension<SharedStore>,
    Path(workspace_id): Path<String>,
) -> Result<Json<Vec<Photo>>, AppError> {
    let photos = store.photos_by_workspace(&workspace_id).await?;
    Ok(Json(photos))
}
