//! PostgreSQL sink using streamed `COPY ... FROM STDIN`.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use super::sink::{BulkOutcome, SeedSink, SinkError};
use crate::generators::GeneratedWorkspace;

const COPY_WORKSPACES: &str = "COPY workspaces (workspace_id, description) FROM STDIN WITH (FORMAT text, DELIMITER '|')";
const COPY_PHOTOS: &str = "COPY photos (workspace_id, url, description) FROM STDIN WITH (FORMAT text, DELIMITER '|')";

/// Relational seed sink.
pub struct PgSink {
    pool: PgPool,
}

impl PgSink {
    /// Creates a sink over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs statements in order on one pooled connection.
    async fn run_statements(&self, statements: &[&str]) -> Result<(), SinkError> {
        let mut conn = self.pool.acquire().await?;
        for statement in statements {
            debug!("{statement}");
            sqlx::query(statement).execute(&mut *conn).await?;
        }
        Ok(())
    }
}

/// Escapes a value for COPY text format with `|` as the delimiter.
pub fn escape_copy_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '|' => escaped.push_str("\\|"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn workspace_rows(batch: &[GeneratedWorkspace]) -> String {
    let mut rows = String::new();
    for workspace in batch {
        rows.push_str(&workspace.sequence.to_string());
        rows.push('|');
        rows.push_str(&escape_copy_text(&workspace.description));
        rows.push('\n');
    }
    rows
}

fn photo_rows(batch: &[GeneratedWorkspace]) -> String {
    let mut rows = String::new();
    for workspace in batch {
        let workspace_id = workspace.sequence.to_string();
        for photo in &workspace.photos {
            rows.push_str(&workspace_id);
            rows.push('|');
            rows.push_str(&escape_copy_text(&photo.url));
            rows.push('|');
            rows.push_str(&escape_copy_text(&photo.description));
            rows.push('\n');
        }
    }
    rows
}

#[async_trait]
impl SeedSink for PgSink {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn drop_structures(&self) -> Result<(), SinkError> {
        self.run_statements(&["DROP TABLE IF EXISTS photos", "DROP TABLE IF EXISTS workspaces"])
            .await
    }

    async fn create_structures(&self) -> Result<(), SinkError> {
        self.run_statements(&[
            r#"
            CREATE TABLE workspaces (
                workspace_id BIGINT NOT NULL,
                description TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE photos (
                photo_id BIGSERIAL,
                workspace_id BIGINT NOT NULL,
                url TEXT NOT NULL,
                description TEXT NOT NULL
            )
            "#,
        ])
        .await?;
        info!("Created workspaces and photos tables");
        Ok(())
    }

    async fn relax_durability(&self) -> Result<(), SinkError> {
        self.run_statements(&[
            "ALTER TABLE photos SET UNLOGGED",
            "ALTER TABLE workspaces SET UNLOGGED",
        ])
        .await
    }

    async fn bulk_insert(&self, batch: &[GeneratedWorkspace]) -> Result<BulkOutcome, SinkError> {
        let workspaces = workspace_rows(batch);
        let photos = photo_rows(batch);

        let mut tx = self.pool.begin().await?;

        let mut copy = tx.copy_in_raw(COPY_WORKSPACES).await?;
        copy.send(workspaces.into_bytes()).await?;
        let inserted = copy.finish().await?;

        let mut copy = tx.copy_in_raw(COPY_PHOTOS).await?;
        copy.send(photos.into_bytes()).await?;
        let photo_count = copy.finish().await?;

        tx.commit().await?;
        debug!(workspaces = inserted, photos = photo_count, "Copied batch");

        let inserted = inserted as usize;
        Ok(BulkOutcome {
            inserted,
            rejected: batch.len().saturating_sub(inserted),
            photos: photo_count as usize,
        })
    }

    async fn restore_durability(&self) -> Result<(), SinkError> {
        self.run_statements(&[
            "ALTER TABLE photos SET LOGGED",
            "ALTER TABLE workspaces SET LOGGED",
        ])
        .await
    }

    async fn create_indexes(&self) -> Result<(), SinkError> {
        self.run_statements(&[
            "CREATE INDEX IF NOT EXISTS photo_id ON photos (photo_id)",
            "CREATE INDEX IF NOT EXISTS photos_workspace_id ON photos (workspace_id)",
            "CREATE INDEX IF NOT EXISTS workspace_id ON workspaces (workspace_id)",
        ])
        .await?;
        info!("Created photo and workspace indexes");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generators::GeneratedPhoto;

    fn workspace(sequence: u64, description: &str, photos: &[(&str, &str)]) -> GeneratedWorkspace {
        GeneratedWorkspace {
            sequence,
            key: sequence.to_string(),
            description: description.to_string(),
            photos: photos
                .iter()
                .map(|(url, description)| GeneratedPhoto {
                    url: url.to_string(),
                    description: description.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_escape_copy_text() {
        assert_eq!(escape_copy_text("plain"), "plain");
        assert_eq!(escape_copy_text("a|b"), "a\\|b");
        assert_eq!(escape_copy_text("back\\slash"), "back\\\\slash");
        assert_eq!(escape_copy_text("two\nlines\r"), "two\\nlines\\r");
        assert_eq!(escape_copy_text("tab\there"), "tab\\there");
    }

    #[test]
    fn test_workspace_rows() {
        let batch = vec![
            workspace(1, "Sunny loft", &[]),
            workspace(2, "Desk | window", &[]),
        ];
        assert_eq!(workspace_rows(&batch), "1|Sunny loft\n2|Desk \\| window\n");
    }

    #[test]
    fn test_photo_rows_flatten_batch() {
        let batch = vec![
            workspace(1, "a", &[("http://x/1.jpg", "kale"), ("http://x/2.jpg", "tofu")]),
            workspace(2, "b", &[("http://x/3.jpg", "banjo")]),
        ];
        assert_eq!(
            photo_rows(&batch),
            "1|http://x/1.jpg|kale\n1|http://x/2.jpg|tofu\n2|http://x/3.jpg|banjo\n"
        );
    }
}
