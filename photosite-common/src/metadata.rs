//! Collection metadata document model
//!
//! One `metadata.json` document describes one collection and its ordered
//! images. Field names on the wire are camelCase; unknown fields are ignored
//! so hand-edited documents with extra keys still load.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-collection metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    pub collection: Collection,
    #[serde(default)]
    pub images: Vec<Image>,
}

/// Collection attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub print_available: bool,
}

impl Collection {
    /// Slug used for collection page links; falls back to the id when the
    /// document leaves it blank.
    pub fn link_slug(&self) -> &str {
        if self.slug.trim().is_empty() {
            &self.id
        } else {
            &self.slug
        }
    }
}

/// One image record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub filename: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub print_available: bool,
    #[serde(default)]
    pub print_sizes: Vec<PrintSize>,
}

impl Image {
    /// Starting print price, if prints are offered and at least one size is listed
    pub fn starting_price(&self) -> Option<f64> {
        if !self.print_available {
            return None;
        }
        self.print_sizes.first().map(|p| p.price)
    }

    /// True when at least one of this image's tags is in `selected`
    pub fn has_tag_in(&self, selected: &BTreeSet<String>) -> bool {
        self.tags.iter().any(|t| selected.contains(t))
    }
}

/// Print size offering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintSize {
    pub size: String,
    pub price: f64,
}

/// Image stamped with its owning collection at load time
///
/// The collection id and title are copied by value; there is no pointer back
/// into the collection document.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub collection_id: String,
    pub collection_title: String,
    pub image: Image,
}

impl MetadataDocument {
    /// Parse a metadata document from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Stamp every image with this document's collection id and title
    pub fn stamped_images(&self) -> impl Iterator<Item = LoadedImage> + '_ {
        self.images.iter().map(move |image| LoadedImage {
            collection_id: self.collection.id.clone(),
            collection_title: self.collection.title.clone(),
            image: image.clone(),
        })
    }
}
