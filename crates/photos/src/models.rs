use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Document `type` tag for workspace documents.
pub const WORKSPACE_DOC_TYPE: &str = "workspace";

/// A photo as served by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Photo {
    pub id: String,
    pub workspace_id: String,
    pub url: String,
    pub description: String,
}

/// Row shape of the relational `photos` table.
#[derive(Debug, FromRow)]
pub struct PhotoRow {
    pub photo_id: i64,
    pub workspace_id: i64,
    pub url: String,
    pub description: String,
}

impl From<PhotoRow> for Photo {
    fn from(row: PhotoRow) -> Self {
        Self {
            id: row.photo_id.to_string(),
            workspace_id: row.workspace_id.to_string(),
            url: row.url,
            description: row.description,
        }
    }
}

/// A photo embedded in a workspace document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoInfo {
    pub url: String,
    pub description: String,
}

/// One workspace with its photos, as stored in the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub workspace_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photos: Vec<PhotoInfo>,
}

impl WorkspaceDocument {
    pub fn new(
        id: String,
        workspace_id: String,
        description: String,
        photos: Vec<PhotoInfo>,
    ) -> Self {
        Self {
            id,
            rev: None,
            doc_type: WORKSPACE_DOC_TYPE.to_string(),
            workspace_id,
            description,
            photos,
        }
    }

    /// Flattens embedded photos into API photos. Photo ids are `{doc_id}.{index}`.
    pub fn into_photos(self) -> Vec<Photo> {
        let doc_id = self.id;
        let workspace_id = self.workspace_id;
        self.photos
            .into_iter()
            .enumerate()
            .map(|(index, info)| Photo {
                id: document_photo_id(&doc_id, index),
                workspace_id: workspace_id.clone(),
                url: info.url,
                description: info.description,
            })
            .collect()
    }
}

/// Builds the API id of a photo embedded in a document.
pub fn document_photo_id(doc_id: &str, index: usize) -> String {
    format!("{doc_id}.{index}")
}

/// Splits a document photo id into the document id and the photo position.
pub fn parse_document_photo_id(id: &str) -> Option<(&str, usize)> {
    let (doc_id, index) = id.rsplit_once('.')?;
    if doc_id.is_empty() {
        return None;
    }
    Some((doc_id, index.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_serializes_couch_fields() {
        let doc = WorkspaceDocument::new(
            "42:000000042".to_string(),
            "42".to_string(),
            "Loft with a view".to_string(),
            vec![PhotoInfo {
                url: "https://img/1.jpg".to_string(),
                description: "kale".to_string(),
            }],
        );
        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["_id"], "42:000000042");
        assert_eq!(value["type"], "workspace");
        assert_eq!(value["workspace_id"], "42");
        assert_eq!(value["photos"][0]["url"], "https://img/1.jpg");
        assert!(value.get("_rev").is_none());
    }

    #[test]
    fn test_into_photos_assigns_positional_ids() {
        let doc = WorkspaceDocument::new(
            "abc".to_string(),
            "7".to_string(),
            String::new(),
            vec![
                PhotoInfo {
                    url: "u0".to_string(),
                    description: "d0".to_string(),
                },
                PhotoInfo {
                    url: "u1".to_string(),
                    description: "d1".to_string(),
                },
            ],
        );
        let photos = doc.into_photos();

        assert_eq!(photos.len(), 2);
        assert_eq!(photos[1].id, "abc.1");
        assert_eq!(photos[1].workspace_id, "7");
        assert_eq!(photos[1].url, "u1");
    }

    #[test]
    fn test_parse_document_photo_id() {
        assert_eq!(parse_document_photo_id("3:000000003.2"), Some(("3:000000003", 2)));
        assert_eq!(parse_document_photo_id("no-index"), None);
        assert_eq!(parse_document_photo_id(".1"), None);
        assert_eq!(parse_document_photo_id("abc.x"), None);
    }
}
