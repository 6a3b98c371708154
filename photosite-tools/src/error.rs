//! Error types for photosite-tools

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenError {
    #[error("Folder not found: {0}")]
    MissingFolder(PathBuf),

    #[error("Missing full-resolution folder: {0}")]
    MissingFullRes(PathBuf),

    #[error("No JPEG images found in {0}")]
    NoImages(PathBuf),

    #[error("Invalid collection id: {0}")]
    InvalidId(String),

    #[error("Image error in {0}: {1}")]
    Image(PathBuf, image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Common(#[from] photosite_common::Error),
}

pub type Result<T> = std::result::Result<T, GenError>;
