//! photosite-web library - portfolio server
//!
//! Server-rendered galleries driven by per-collection metadata documents,
//! plus the contact form endpoint.

use axum::Router;
use photosite_common::config::{ResponseFormat, TomlConfig};
use photosite_common::AssetPaths;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod contact;
pub mod gallery;
pub mod lightbox;
pub mod loader;
pub mod render;

use contact::ContactService;
use loader::MetadataSource;
use render::Renderer;

pub const DEFAULT_SITE_TITLE: &str = "Photography Portfolio";

/// Gallery settings shared by the page handlers
#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Collection ids in display order
    pub collections: Vec<String>,
    pub featured_fallback: usize,
    pub default_tags: BTreeSet<String>,
}

impl SiteSettings {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            collections: config.gallery.collections.clone(),
            featured_fallback: config.gallery.featured_fallback,
            default_tags: config.gallery.default_tags.iter().cloned().collect(),
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<SiteSettings>,
    pub source: Arc<dyn MetadataSource>,
    pub renderer: Arc<Renderer>,
    /// `None` when contact settings are incomplete: the endpoint answers 500
    pub contact: Option<Arc<ContactService>>,
    /// Reply format used even when the contact service is unavailable
    pub contact_format: ResponseFormat,
    /// Folder served under `/assets`
    pub assets_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        site: SiteSettings,
        source: Arc<dyn MetadataSource>,
        renderer: Renderer,
        contact: Option<ContactService>,
        contact_format: ResponseFormat,
    ) -> Self {
        Self {
            site: Arc::new(site),
            source,
            renderer: Arc::new(renderer),
            contact: contact.map(Arc::new),
            contact_format,
            assets_dir: None,
        }
    }

    pub fn with_assets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(dir.into());
        self
    }
}

/// Asset URLs for a config: the gallery base path doubles as the URL path
pub fn asset_paths(config: &TomlConfig) -> AssetPaths {
    AssetPaths::new(
        format!("/{}", config.gallery.base_path.trim_matches('/')),
        config.gallery.full_res_dir.clone(),
    )
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(api::page_routes())
        .merge(api::contact_routes())
        .merge(api::health_routes());

    if let Some(dir) = &state.assets_dir {
        router = router.nest_service("/assets", ServeDir::new(dir));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
