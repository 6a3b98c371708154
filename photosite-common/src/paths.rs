//! Asset path conventions
//!
//! Every collection lives in its own folder under the gallery base:
//!
//! ```text
//! <base>/<collection id>/metadata.json
//! <base>/<collection id>/thumbnails/<filename>
//! <base>/<collection id>/<full dir>/<filename>
//! ```

use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Default gallery base, relative to the site root folder
pub const DEFAULT_GALLERY_BASE: &str = "assets/images/gallery";
/// Default full-resolution subfolder name
pub const DEFAULT_FULL_RES_DIR: &str = "full-res";
pub const THUMBNAIL_DIR: &str = "thumbnails";
pub const METADATA_FILE: &str = "metadata.json";

/// Builds public URLs for a gallery's image assets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    /// URL prefix without trailing slash, e.g. `/assets/images/gallery`
    url_base: String,
    full_res_dir: String,
}

impl AssetPaths {
    pub fn new(url_base: impl Into<String>, full_res_dir: impl Into<String>) -> Self {
        let url_base = url_base.into();
        Self {
            url_base: url_base.trim_end_matches('/').to_string(),
            full_res_dir: full_res_dir.into(),
        }
    }

    /// URL of the low-resolution thumbnail used for initial paint
    pub fn thumbnail_url(&self, collection_id: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.url_base,
            encode(collection_id),
            THUMBNAIL_DIR,
            encode(filename)
        )
    }

    /// URL of the full-resolution image shown in the lightbox
    pub fn full_res_url(&self, collection_id: &str, filename: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.url_base,
            encode(collection_id),
            self.full_res_dir,
            encode(filename)
        )
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self::new(format!("/{}", DEFAULT_GALLERY_BASE), DEFAULT_FULL_RES_DIR)
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Check that a collection identifier is safe to use as a single path segment
///
/// Identifiers are limited to ASCII letters, digits, `-` and `_`.
pub fn validate_collection_id(id: &str) -> Result<&str> {
    let valid = !id.is_empty()
        && id.len() <= 128
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(id)
    } else {
        Err(Error::InvalidInput(format!("invalid collection id: {:?}", id)))
    }
}

/// On-disk folder of one collection
pub fn collection_dir(gallery_dir: &Path, collection_id: &str) -> Result<PathBuf> {
    Ok(gallery_dir.join(validate_collection_id(collection_id)?))
}

/// On-disk metadata document of one collection
pub fn metadata_file(gallery_dir: &Path, collection_id: &str) -> Result<PathBuf> {
    Ok(collection_dir(gallery_dir, collection_id)?.join(METADATA_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let paths = AssetPaths::default();
        assert_eq!(
            paths.thumbnail_url("japan-2025", "kyoto.jpg"),
            "/assets/images/gallery/japan-2025/thumbnails/kyoto.jpg"
        );
        assert_eq!(
            paths.full_res_url("japan-2025", "kyoto.jpg"),
            "/assets/images/gallery/japan-2025/full-res/kyoto.jpg"
        );
    }

    #[test]
    fn test_full_dir_variant_and_trailing_slash() {
        let paths = AssetPaths::new("/gallery/", "full");
        assert_eq!(paths.full_res_url("c", "x.jpg"), "/gallery/c/full/x.jpg");
    }

    #[test]
    fn test_filenames_are_percent_encoded() {
        let paths = AssetPaths::default();
        assert_eq!(
            paths.thumbnail_url("c", "Torii Gate - Screen.jpg"),
            "/assets/images/gallery/c/thumbnails/Torii%20Gate%20-%20Screen.jpg"
        );
    }

    #[test]
    fn test_validate_collection_id() {
        assert!(validate_collection_id("big-bend_2025").is_ok());
        assert!(validate_collection_id("").is_err());
        assert!(validate_collection_id("../etc").is_err());
        assert!(validate_collection_id("a/b").is_err());
        assert!(validate_collection_id("a b").is_err());
    }

    #[test]
    fn test_metadata_file_path() {
        let path = metadata_file(Path::new("/srv/gallery"), "japan-2025").unwrap();
        assert_eq!(path, PathBuf::from("/srv/gallery/japan-2025/metadata.json"));
        assert!(metadata_file(Path::new("/srv/gallery"), "..").is_err());
    }
}
