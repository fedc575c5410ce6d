use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::{Photo, PhotoRow};
use crate::store::{MAX_LISTED_PHOTOS, PhotoStore};

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_all_photos(&self, limit: i64) -> Result<Vec<Photo>, AppError> {
        let rows: Vec<PhotoRow> = sqlx::query_as(
            r#"
            SELECT photo_id, workspace_id, url, description
            FROM photos
            ORDER BY photo_id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Photo::from).collect())
    }

    pub async fn get_photo_by_id(&self, photo_id: i64) -> Result<Option<Photo>, AppError> {
        let row: Option<PhotoRow> = sqlx::query_as(
            r#"
            SELECT photo_id, workspace_id, url, description
            FROM photos
            WHERE photo_id = $1
            "#,
        )
        .bind(photo_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Photo::from))
    }

    pub async fn get_photos_by_workspace_id(
        &self,
        workspace_id: i64,
    ) -> Result<Vec<Photo>, AppError> {
        let rows: Vec<PhotoRow> = sqlx::query_as(
            r#"
            SELECT photo_id, workspace_id, url, description
            FROM photos
            WHERE workspace_id = $1
            ORDER BY photo_id
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Photo::from).collect())
    }
}

fn parse_id(kind: &str, raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::InvalidInput(format!("Invalid {kind}: {raw}")))
}

#[async_trait]
impl PhotoStore for Database {
    async fn all_photos(&self) -> Result<Vec<Photo>, AppError> {
        self.get_all_photos(MAX_LISTED_PHOTOS as i64).await
    }

    async fn photo_by_id(&self, id: &str) -> Result<Option<Photo>, AppError> {
        self.get_photo_by_id(parse_id("photo id", id)?).await
    }

    async fn photos_by_workspace(&self, workspace_id: &str) -> Result<Vec<Photo>, AppError> {
        self.get_photos_by_workspace_id(parse_id("workspace id", workspace_id)?)
            .await
    }
}
