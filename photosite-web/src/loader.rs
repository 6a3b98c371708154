//! Metadata loader
//!
//! Fetches one `metadata.json` document per collection id, in declared order,
//! one at a time. A failed fetch (network error, non-2xx status, missing file,
//! malformed JSON) is logged and skipped; it never aborts the remaining ids.
//! There are no retries.

use async_trait::async_trait;
use photosite_common::paths::{self, METADATA_FILE};
use photosite_common::MetadataDocument;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("photosite-web/", env!("CARGO_PKG_VERSION"));
const FETCH_TIMEOUT_SECS: u64 = 10;

/// Why one collection could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid collection id: {0}")]
    InvalidId(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Metadata not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Malformed metadata: {0}")]
    Parse(String),
}

/// Where metadata documents come from
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Retrieve and parse one collection's document
    async fn fetch(&self, collection_id: &str) -> Result<MetadataDocument, LoadError>;
}

/// Metadata served over HTTP at `<base url>/<id>/metadata.json`
pub struct HttpMetadataSource {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpMetadataSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, LoadError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| LoadError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn document_url(&self, collection_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection_id, METADATA_FILE)
    }
}

#[async_trait]
impl MetadataSource for HttpMetadataSource {
    async fn fetch(&self, collection_id: &str) -> Result<MetadataDocument, LoadError> {
        paths::validate_collection_id(collection_id)
            .map_err(|_| LoadError::InvalidId(collection_id.to_string()))?;

        let url = self.document_url(collection_id);
        debug!(url = %url, "Fetching collection metadata");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| LoadError::Network(e.to_string()))?;

        MetadataDocument::from_slice(&bytes).map_err(|e| LoadError::Parse(e.to_string()))
    }
}

/// Metadata read from the site's gallery folder on disk
pub struct DirectoryMetadataSource {
    gallery_dir: PathBuf,
}

impl DirectoryMetadataSource {
    pub fn new(gallery_dir: impl Into<PathBuf>) -> Self {
        Self {
            gallery_dir: gallery_dir.into(),
        }
    }
}

#[async_trait]
impl MetadataSource for DirectoryMetadataSource {
    async fn fetch(&self, collection_id: &str) -> Result<MetadataDocument, LoadError> {
        let path = paths::metadata_file(&self.gallery_dir, collection_id)
            .map_err(|_| LoadError::InvalidId(collection_id.to_string()))?;

        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LoadError::NotFound(path.display().to_string())
            } else {
                LoadError::Io(e.to_string())
            }
        })?;

        MetadataDocument::from_slice(&bytes).map_err(|e| LoadError::Parse(e.to_string()))
    }
}

/// A collection that was skipped during a batch load
#[derive(Debug)]
pub struct SkippedCollection {
    pub collection_id: String,
    pub reason: LoadError,
}

/// Outcome of a batch load: loaded documents in declared order plus skips
#[derive(Debug, Default)]
pub struct LoadReport {
    pub documents: Vec<MetadataDocument>,
    pub skipped: Vec<SkippedCollection>,
}

impl LoadReport {
    pub fn image_count(&self) -> usize {
        self.documents.iter().map(|d| d.images.len()).sum()
    }
}

/// Load every listed collection, sequentially, skipping failures
pub async fn load_collections(source: &dyn MetadataSource, collection_ids: &[String]) -> LoadReport {
    let mut report = LoadReport::default();

    for collection_id in collection_ids {
        match source.fetch(collection_id).await {
            Ok(document) => report.documents.push(document),
            Err(reason) => {
                warn!(collection = %collection_id, "Failed to load metadata: {}", reason);
                report.skipped.push(SkippedCollection {
                    collection_id: collection_id.clone(),
                    reason,
                });
            }
        }
    }

    info!(
        "Loaded {} of {} collections ({} images)",
        report.documents.len(),
        collection_ids.len(),
        report.image_count()
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn write_collection(gallery: &Path, id: &str, images: usize) {
        let dir = gallery.join(id);
        std::fs::create_dir_all(&dir).unwrap();
        let images: Vec<_> = (0..images)
            .map(|i| {
                serde_json::json!({
                    "filename": format!("{}-{}.jpg", id, i),
                    "title": format!("Image {}", i),
                    "description": "test",
                    "tags": ["travel"]
                })
            })
            .collect();
        let doc = serde_json::json!({
            "collection": {
                "id": id,
                "title": format!("Title {}", id),
                "slug": id,
                "location": "Somewhere",
                "date": "2025",
                "description": "A collection"
            },
            "images": images
        });
        std::fs::write(dir.join("metadata.json"), doc.to_string()).unwrap();
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_one_missing_collection_is_skipped() {
        let gallery = tempfile::tempdir().unwrap();
        write_collection(gallery.path(), "alpha", 3);
        write_collection(gallery.path(), "gamma", 2);

        let source = DirectoryMetadataSource::new(gallery.path());
        let report = load_collections(&source, &ids(&["alpha", "beta", "gamma"])).await;

        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.image_count(), 5);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].collection_id, "beta");
        assert!(matches!(report.skipped[0].reason, LoadError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_document_is_skipped_and_order_kept() {
        let gallery = tempfile::tempdir().unwrap();
        write_collection(gallery.path(), "first", 1);
        std::fs::create_dir_all(gallery.path().join("broken")).unwrap();
        std::fs::write(gallery.path().join("broken/metadata.json"), "{ nope").unwrap();
        write_collection(gallery.path(), "last", 1);

        let source = DirectoryMetadataSource::new(gallery.path());
        let report = load_collections(&source, &ids(&["first", "broken", "last"])).await;

        let loaded: Vec<_> = report.documents.iter().map(|d| d.collection.id.as_str()).collect();
        assert_eq!(loaded, vec!["first", "last"]);
        assert!(matches!(report.skipped[0].reason, LoadError::Parse(_)));
    }

    #[tokio::test]
    async fn test_traversal_id_rejected() {
        let gallery = tempfile::tempdir().unwrap();
        let source = DirectoryMetadataSource::new(gallery.path());
        let result = source.fetch("../secrets").await;
        assert!(matches!(result, Err(LoadError::InvalidId(_))));
    }

    #[tokio::test]
    async fn test_empty_id_list() {
        let gallery = tempfile::tempdir().unwrap();
        let source = DirectoryMetadataSource::new(gallery.path());
        let report = load_collections(&source, &[]).await;
        assert!(report.documents.is_empty());
        assert!(report.skipped.is_empty());
    }
}
