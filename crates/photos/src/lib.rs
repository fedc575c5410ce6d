pub mod couch;
pub mod database;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod request_id;
pub mod store;

use std::path::PathBuf;

use axum::{
    Extension, Json, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
};
use utoipa::OpenApi;

use crate::{
    handlers::{get_all_photos, get_photo, get_workspace_photos, health_check},
    models::Photo,
    request_id::request_id_middleware,
    store::SharedStore,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_all_photos,
        handlers::get_photo,
        handlers::get_workspace_photos,
        handlers::health_check,
    ),
    components(schemas(Photo)),
    tags(
        (name = "photos", description = "Workspace photo catalog"),
        (name = "stats", description = "Service health")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn create_router(store: SharedStore, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .allow_origin(Any);

    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        // Photo routes
        .route("/api/photos", get(get_all_photos))
        .route("/api/photos/{id}", get(get_photo))
        .route(
            "/api/photos/workspace/{workspace_id}",
            get(get_workspace_photos),
        );

    // Client bundle, falling back to index.html for client-side routes
    if let Some(dir) = static_dir {
        let index = dir.join("index.html");
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    router
        .layer(Extension(store))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(CompressionLayer::new())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
}

pub async fn run_server(
    store: SharedStore,
    static_dir: Option<PathBuf>,
    port: u16,
) -> anyhow::Result<()> {
    let app = create_router(store, static_dir);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    tracing::info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
