//! Reads the book metadata file and maps read failures to HTTP responses.

use std::path::{Path, PathBuf};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Books metadata file not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Invalid JSON in books metadata: {details}")]
    InvalidJson { details: String },

    #[error("Failed to read books metadata: {details}")]
    Io { details: String },
}

impl CatalogError {
    pub fn status(&self) -> StatusCode {
        match self {
            CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
            CatalogError::InvalidJson { .. } => StatusCode::BAD_REQUEST,
            CatalogError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            CatalogError::NotFound { path } => json!({
                "error": "Books metadata file not found",
                "path": path.display().to_string(),
            }),
            CatalogError::InvalidJson { details } => json!({
                "error": "Invalid JSON in books metadata file",
                "details": details,
            }),
            CatalogError::Io { details } => json!({
                "error": "Failed to read books metadata",
                "details": details,
            }),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        tracing::warn!("Catalog request failed: {}", self);
        (self.status(), Json(self.body())).into_response()
    }
}

/// Read and parse the metadata file. The content is returned as parsed,
/// without normalization.
pub async fn read_catalog(path: &Path) -> Result<Value, CatalogError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(CatalogError::Io {
                details: e.to_string(),
            })
        }
    };

    serde_json::from_str(&raw).map_err(|e| CatalogError::InvalidJson {
        details: e.to_string(),
    })
}

/// Find the record whose `id` equals `id`, as a number or a numeric string.
pub fn find_record<'a>(catalog: &'a Value, id: &str) -> Option<&'a Value> {
    let wanted = id.trim();
    catalog.as_array()?.iter().find(|record| match record.get("id") {
        Some(Value::Number(n)) => n.to_string() == wanted,
        Some(Value::String(s)) => s.trim() == wanted,
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_catalog(&dir.path().join("metadata.json"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.body()["error"], "Books metadata file not found");
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        std::fs::write(&path, "[{").unwrap();
        let err = read_catalog(&path).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.body()["details"].is_string());
    }

    #[test]
    fn test_find_record() {
        let catalog = json!([{"id": 1}, {"id": "2"}, {"title": "no id"}]);
        assert!(find_record(&catalog, "1").is_some());
        assert!(find_record(&catalog, "2").is_some());
        assert!(find_record(&catalog, "3").is_none());
        assert!(find_record(&json!({}), "1").is_none());
    }
}
