//! photosite-tools library - offline gallery maintenance
//!
//! Thumbnail generation for collection folders and scaffolding of new
//! collections (thumbnails, `metadata.json`, config registration).

pub mod collection;
pub mod error;
pub mod thumbnails;

pub use error::{GenError, Result};
