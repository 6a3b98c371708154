//! Gallery maintenance tool (photosite-gen)
//!
//! **Usage:**
//! ```bash
//! photosite-gen thumbnails [--gallery DIR] [--width 800] [--quality 85]
//! photosite-gen collection <folder> --title T --location L --date D --description TEXT
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use photosite_common::paths::DEFAULT_GALLERY_BASE;
use std::path::PathBuf;
use tracing::info;

use photosite_tools::collection::{self, CollectionInfo, COLLECTION_THUMBNAIL_WIDTH};
use photosite_tools::thumbnails::{self, ThumbnailOptions, DEFAULT_QUALITY, DEFAULT_WIDTH};

/// Thumbnail generation and collection scaffolding
#[derive(Parser, Debug)]
#[command(name = "photosite-gen")]
#[command(about = "Generate thumbnails and scaffold new gallery collections")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create missing thumbnails for every collection in the gallery
    Thumbnails {
        /// Gallery folder holding one subfolder per collection
        #[arg(long, default_value = DEFAULT_GALLERY_BASE)]
        gallery: PathBuf,

        /// Thumbnail width in pixels
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u32,

        /// JPEG quality (1-100)
        #[arg(long, default_value_t = DEFAULT_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,
    },

    /// Scaffold a new collection from <folder>/full-res
    Collection {
        /// Collection folder; its name becomes the collection id
        folder: PathBuf,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        location: String,

        #[arg(long, default_value = "")]
        date: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Thumbnail width in pixels
        #[arg(long, default_value_t = COLLECTION_THUMBNAIL_WIDTH)]
        width: u32,

        /// Site config file to register the collection in
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Command::Thumbnails {
            gallery,
            width,
            quality,
        } => {
            let options = ThumbnailOptions {
                width,
                quality,
                skip_existing: true,
            };
            let stats = thumbnails::process_gallery(&gallery, &options)
                .with_context(|| format!("Thumbnail generation failed for {}", gallery.display()))?;

            info!(
                "Thumbnail generation complete: {} created, {} skipped, {} failed ({:.0}% size reduction)",
                stats.created,
                stats.skipped,
                stats.failed,
                stats.reduction_percent()
            );
        }
        Command::Collection {
            folder,
            title,
            location,
            date,
            description,
            width,
            config,
        } => {
            let details = CollectionInfo {
                title,
                location,
                date,
                description,
            };
            let report = collection::generate_collection(&folder, &details, width, config.as_deref())
                .with_context(|| format!("Could not generate collection from {}", folder.display()))?;

            info!("Collection: {} ({})", details.title, report.collection_id);
            info!(
                "  Images: {} ({} featured), thumbnails: {} created",
                report.image_count, report.featured_count, report.thumbnails.created
            );
            info!("  Metadata: {}", report.metadata_path.display());
            info!("  Config: {}", report.config_path.display());
            info!("Review tags, displayCategory and descriptions in metadata.json before publishing");
        }
    }

    Ok(())
}
