//! Portfolio server (photosite-web) - Main entry point
//!
//! Serves the homepage, browse view, collection pages, static assets, and the
//! contact form endpoint.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use photosite_common::config::{self, ContactSettings, TomlConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use photosite_web::contact::ContactService;
use photosite_web::loader::{DirectoryMetadataSource, HttpMetadataSource, MetadataSource};
use photosite_web::render::Renderer;
use photosite_web::{asset_paths, build_router, AppState, SiteSettings, DEFAULT_SITE_TITLE};

/// Command-line arguments for photosite-web
#[derive(Parser, Debug)]
#[command(name = "photosite-web")]
#[command(about = "Photography portfolio server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "PHOTOSITE_PORT")]
    port: u16,

    /// Site root folder (contains assets/)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Secrets usually live in .env next to the site
    let dotenv_path = dotenvy::dotenv().ok();

    // Read the config before the subscriber exists so [logging] can set the level
    let (toml_config, config_origin) = TomlConfig::load_or_default(args.config.as_deref());

    let level = &toml_config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "photosite_web={level},photosite_common={level},tower_http={level}"
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "photosite-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }
    config_origin.log();

    let root_folder = config::resolve_root_folder(args.root_folder.as_deref(), &toml_config);
    info!("Root folder: {}", root_folder.display());

    let source: Arc<dyn MetadataSource> = match &toml_config.gallery.metadata_url {
        Some(url) => {
            info!("Metadata source: {}", url);
            Arc::new(HttpMetadataSource::new(url.clone()).context("Failed to build HTTP client")?)
        }
        None => {
            let gallery_dir = root_folder.join(&toml_config.gallery.base_path);
            info!("Metadata source: {}", gallery_dir.display());
            Arc::new(DirectoryMetadataSource::new(gallery_dir))
        }
    };
    info!(
        "{} collection(s) configured",
        toml_config.gallery.collections.len()
    );

    let site_title = toml_config
        .site_title
        .clone()
        .unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string());
    let renderer = Renderer::new(asset_paths(&toml_config), site_title);

    // Incomplete contact settings disable the endpoint, not the site
    let contact = match ContactSettings::from_env(&toml_config.contact) {
        Ok(settings) => match ContactService::from_settings(settings) {
            Ok(service) => {
                info!(
                    bot_protection = service.settings().recaptcha.is_some(),
                    "Contact endpoint ready"
                );
                Some(service)
            }
            Err(e) => {
                warn!("Contact endpoint disabled: {}", e);
                None
            }
        },
        Err(e) => {
            warn!("Contact endpoint disabled: {}", e);
            None
        }
    };

    let state = AppState::new(
        SiteSettings::from_config(&toml_config),
        source,
        renderer,
        contact,
        toml_config.contact.response_format,
    )
    .with_assets_dir(root_folder.join("assets"));

    let app = build_router(state);

    let addr = match &toml_config.bind {
        Some(host) => format!("{}:{}", host, args.port)
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid bind address: {}", host))?,
        None => SocketAddr::from(([0, 0, 0, 0], args.port)),
    };

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
