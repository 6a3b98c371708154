//! Thumbnail generation
//!
//! Every collection folder keeps its originals in `full-res/` and web-sized
//! copies with the same filenames in `thumbnails/`. Thumbnails are
//! aspect-preserving resizes to a fixed width, re-encoded as JPEG.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use photosite_common::paths::{DEFAULT_FULL_RES_DIR, THUMBNAIL_DIR};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{GenError, Result};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThumbnailOptions {
    /// Target width in pixels
    pub width: u32,
    /// JPEG quality (1-100)
    pub quality: u8,
    /// Leave thumbnails that already exist untouched
    pub skip_existing: bool,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            quality: DEFAULT_QUALITY,
            skip_existing: true,
        }
    }
}

/// Per-run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThumbnailStats {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Bytes of originals that were converted
    pub source_bytes: u64,
    /// Bytes of the thumbnails written
    pub thumbnail_bytes: u64,
}

impl ThumbnailStats {
    /// Size reduction of created thumbnails vs. their originals, in percent
    pub fn reduction_percent(&self) -> f64 {
        if self.source_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.thumbnail_bytes as f64 / self.source_bytes as f64) * 100.0
    }

    pub fn merge(&mut self, other: &ThumbnailStats) {
        self.created += other.created;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.source_bytes += other.source_bytes;
        self.thumbnail_bytes += other.thumbnail_bytes;
    }
}

/// `.jpg` / `.jpeg`, any case
pub fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

/// JPEG files directly inside `dir`, sorted by filename
pub fn list_jpegs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() && is_jpeg(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Height that keeps the aspect ratio at `width`
pub fn scaled_height(src_width: u32, src_height: u32, width: u32) -> u32 {
    if src_width == 0 {
        return 0;
    }
    let height = u64::from(width) * u64::from(src_height) / u64::from(src_width);
    height.max(1) as u32
}

/// Resize one image to `options.width` (Lanczos3) and write it as JPEG
///
/// Returns the dimensions written.
pub fn create_thumbnail(source: &Path, dest: &Path, options: &ThumbnailOptions) -> Result<(u32, u32)> {
    let img = image::open(source).map_err(|e| GenError::Image(source.to_path_buf(), e))?;

    let height = scaled_height(img.width(), img.height(), options.width);
    let resized = img
        .resize_exact(options.width, height, FilterType::Lanczos3)
        .to_rgb8();

    let writer = BufWriter::new(File::create(dest)?);
    let mut encoder = JpegEncoder::new_with_quality(writer, options.quality);
    encoder
        .encode_image(&resized)
        .map_err(|e| GenError::Image(dest.to_path_buf(), e))?;

    Ok((options.width, height))
}

/// Generate thumbnails for one collection folder
///
/// Individual image failures are logged and counted; they do not stop the run.
pub fn process_collection(collection_dir: &Path, options: &ThumbnailOptions) -> Result<ThumbnailStats> {
    let full_res = collection_dir.join(DEFAULT_FULL_RES_DIR);
    if !full_res.is_dir() {
        return Err(GenError::MissingFullRes(full_res));
    }

    let thumbnails = collection_dir.join(THUMBNAIL_DIR);
    fs::create_dir_all(&thumbnails)?;

    let mut stats = ThumbnailStats::default();
    for source in list_jpegs(&full_res)? {
        let Some(name) = source.file_name() else {
            continue;
        };
        let dest = thumbnails.join(name);

        if options.skip_existing && dest.exists() {
            debug!("Skipping {} (thumbnail exists)", source.display());
            stats.skipped += 1;
            continue;
        }

        match create_thumbnail(&source, &dest, options) {
            Ok((width, height)) => {
                let source_size = fs::metadata(&source).map(|m| m.len()).unwrap_or(0);
                let thumb_size = fs::metadata(&dest).map(|m| m.len()).unwrap_or(0);
                info!(
                    "  {} -> {}x{} ({:.2}MB -> {:.2}MB)",
                    name.to_string_lossy(),
                    width,
                    height,
                    megabytes(source_size),
                    megabytes(thumb_size)
                );
                stats.created += 1;
                stats.source_bytes += source_size;
                stats.thumbnail_bytes += thumb_size;
            }
            Err(e) => {
                warn!("Failed to process {}: {}", source.display(), e);
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}

/// Generate thumbnails for every collection folder under the gallery
pub fn process_gallery(gallery_dir: &Path, options: &ThumbnailOptions) -> Result<ThumbnailStats> {
    if !gallery_dir.is_dir() {
        return Err(GenError::MissingFolder(gallery_dir.to_path_buf()));
    }

    let mut folders = Vec::new();
    for entry in WalkDir::new(gallery_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_dir() {
            folders.push(entry.into_path());
        }
    }
    folders.sort();
    info!("Found {} gallery folder(s) in {}", folders.len(), gallery_dir.display());

    let mut total = ThumbnailStats::default();
    for folder in folders {
        info!("Processing {}", folder.display());
        match process_collection(&folder, options) {
            Ok(stats) => {
                info!(
                    "  Complete: {} created, {} skipped, {} failed",
                    stats.created, stats.skipped, stats.failed
                );
                total.merge(&stats);
            }
            Err(GenError::MissingFullRes(path)) => {
                warn!("  No full-res folder found at {}", path.display());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(total)
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
