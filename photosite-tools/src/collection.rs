//! New collection scaffolding
//!
//! Turns a folder of originals into a publishable collection: thumbnails,
//! a starter `metadata.json`, and an entry in the site config's
//! `gallery.collections` list.

use once_cell::sync::Lazy;
use photosite_common::config::{self, TomlConfig};
use photosite_common::paths::{self, DEFAULT_FULL_RES_DIR, METADATA_FILE};
use photosite_common::{Collection, Image, MetadataDocument, PrintSize};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::thumbnails::{self, ThumbnailOptions, ThumbnailStats};
use crate::{GenError, Result};

pub const COLLECTION_THUMBNAIL_WIDTH: u32 = 400;
pub const DEFAULT_IMAGE_DESCRIPTION: &str = "A photograph from the collection";
pub const DEFAULT_DISPLAY_CATEGORY: &str = "Travel & Adventure";
pub const DEFAULT_IMAGE_TAG: &str = "travel";
/// Written when no config file resolves
pub const FALLBACK_CONFIG_FILE: &str = "photosite.toml";

static SCREEN_SUFFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*-\s*Screen\s*$").expect("valid suffix regex"));

/// Collection-level details supplied by the photographer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionInfo {
    pub title: String,
    pub location: String,
    pub date: String,
    pub description: String,
}

/// What `generate_collection` did
#[derive(Debug)]
pub struct CollectionReport {
    pub collection_id: String,
    pub metadata_path: PathBuf,
    pub image_count: usize,
    pub featured_count: usize,
    pub thumbnails: ThumbnailStats,
    /// Config file that lists the collection
    pub config_path: PathBuf,
    /// False when the id was already listed
    pub registered: bool,
}

/// Title and description from `"Title - Description - Screen.jpg"`
///
/// A trailing ` - Screen` marker is dropped; without a description part the
/// generic description is used.
pub fn parse_filename(filename: &str) -> (String, String) {
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename);
    let stem = SCREEN_SUFFIX_RE.replace(stem, "");

    match stem.split_once(" - ") {
        Some((title, description)) => (title.trim().to_string(), description.trim().to_string()),
        None => (stem.trim().to_string(), DEFAULT_IMAGE_DESCRIPTION.to_string()),
    }
}

/// Lowercased title with spaces as hyphens
pub fn image_id(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

/// First, every third, and last image
pub fn is_featured(index: usize, count: usize) -> bool {
    index == 0 || index % 3 == 0 || index + 1 == count
}

pub fn default_print_sizes() -> Vec<PrintSize> {
    [("8x10", 50.0), ("11x14", 85.0), ("16x20", 140.0), ("20x30", 235.0)]
        .into_iter()
        .map(|(size, price)| PrintSize {
            size: size.to_string(),
            price,
        })
        .collect()
}

/// Starter metadata document for the given image filenames (in order)
pub fn build_metadata(collection_id: &str, info: &CollectionInfo, filenames: &[String]) -> MetadataDocument {
    let count = filenames.len();
    let images: Vec<Image> = filenames
        .iter()
        .enumerate()
        .map(|(index, filename)| {
            let (title, description) = parse_filename(filename);
            Image {
                id: Some(image_id(&title)),
                filename: filename.clone(),
                title,
                description,
                location: Some(info.location.clone()),
                tags: vec![DEFAULT_IMAGE_TAG.to_string()],
                featured: is_featured(index, count),
                print_available: true,
                print_sizes: default_print_sizes(),
            }
        })
        .collect();

    MetadataDocument {
        collection: Collection {
            id: collection_id.to_string(),
            title: info.title.clone(),
            slug: collection_id.to_string(),
            location: info.location.clone(),
            date: info.date.clone(),
            description: info.description.clone(),
            display_category: Some(DEFAULT_DISPLAY_CATEGORY.to_string()),
            cover_image: filenames.first().cloned(),
            featured: true,
            print_available: true,
        },
        images,
    }
}

/// Add the collection to the config file, creating the file if needed
///
/// Returns `true` when the list changed.
pub fn register_in_config(config_path: &Path, collection_id: &str) -> Result<bool> {
    let mut config = if config_path.exists() {
        TomlConfig::load(config_path)?
    } else {
        TomlConfig::default()
    };

    if !config.register_collection(collection_id) {
        return Ok(false);
    }
    config.save(config_path)?;
    Ok(true)
}

/// Scaffold a collection from `<folder>/full-res/*.jpg`
///
/// The folder name is the collection id. Thumbnails are regenerated at
/// `thumbnail_width`; an existing `metadata.json` is overwritten.
pub fn generate_collection(
    folder: &Path,
    info: &CollectionInfo,
    thumbnail_width: u32,
    config_path: Option<&Path>,
) -> Result<CollectionReport> {
    if !folder.is_dir() {
        return Err(GenError::MissingFolder(folder.to_path_buf()));
    }
    let full_res = folder.join(DEFAULT_FULL_RES_DIR);
    if !full_res.is_dir() {
        return Err(GenError::MissingFullRes(full_res));
    }

    let collection_id = folder
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| GenError::InvalidId(folder.display().to_string()))?;
    let collection_id = paths::validate_collection_id(collection_id)
        .map_err(|_| GenError::InvalidId(collection_id.to_string()))?
        .to_string();

    let sources = thumbnails::list_jpegs(&full_res)?;
    if sources.is_empty() {
        return Err(GenError::NoImages(full_res));
    }
    info!("Found {} images in {}", sources.len(), full_res.display());

    let options = ThumbnailOptions {
        width: thumbnail_width,
        skip_existing: false,
        ..Default::default()
    };
    let thumbnail_stats = thumbnails::process_collection(folder, &options)?;

    let filenames: Vec<String> = sources
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .collect();
    let document = build_metadata(&collection_id, info, &filenames);
    let featured_count = document.images.iter().filter(|i| i.featured).count();

    let metadata_path = folder.join(METADATA_FILE);
    fs::write(&metadata_path, serde_json::to_string_pretty(&document)?)?;
    info!("Created {}", metadata_path.display());

    let config_path = config::resolve_config_path(config_path)
        .unwrap_or_else(|| PathBuf::from(FALLBACK_CONFIG_FILE));
    let registered = register_in_config(&config_path, &collection_id)?;
    if registered {
        info!("Registered {} in {}", collection_id, config_path.display());
    } else {
        warn!("{} already lists {}", config_path.display(), collection_id);
    }

    Ok(CollectionReport {
        collection_id,
        metadata_path,
        image_count: document.images.len(),
        featured_count,
        thumbnails: thumbnail_stats,
        config_path,
        registered,
    })
}
