//! # PhotoSite Common Library
//!
//! Shared code for the PhotoSite server and tooling:
//! - Collection metadata document model
//! - Asset path conventions
//! - Configuration loading
//! - Error types

pub mod config;
pub mod error;
pub mod metadata;
pub mod paths;

pub use error::{Error, Result};
pub use metadata::{Collection, Image, LoadedImage, MetadataDocument, PrintSize};
pub use paths::AssetPaths;
