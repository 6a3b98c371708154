//! Gallery pages
//!
//! Each page view loads the metadata it needs, builds its own state and
//! renders a complete document. Load failures degrade to empty or error
//! states; they never fail the request with a server error.

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use photosite_common::MetadataDocument;
use serde::Deserialize;
use tracing::{debug, warn};

use super::error::{ApiError, PageResult};
use crate::gallery::{parse_tag_list, BrowseState};
use crate::loader::load_collections;
use crate::AppState;

/// Build page routes
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home_page))
        .route("/browse", get(browse_page))
        .route("/collection", get(collection_page))
}

/// GET /
///
/// Featured previews of every configured collection.
pub async fn home_page(State(state): State<AppState>) -> Html<String> {
    let report = load_collections(state.source.as_ref(), &state.site.collections).await;
    let body = state
        .renderer
        .homepage(&report.documents, state.site.featured_fallback);
    Html(state.renderer.page(None, &body))
}

/// Query parameters for the browse view
#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    /// Comma-separated tags; absent = configured defaults, empty = all
    pub tags: Option<String>,
}

/// GET /browse
///
/// All collections, filtered by the selected tags and grouped by collection.
pub async fn browse_page(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Html<String> {
    let report = load_collections(state.source.as_ref(), &state.site.collections).await;

    let mut browse = BrowseState::from_documents(&report.documents);
    match &query.tags {
        Some(raw) => browse.select_tags(parse_tag_list(raw)),
        None => browse.select_tags(state.site.default_tags.iter().cloned()),
    }

    let body = state.renderer.browse(&browse);
    Html(state.renderer.page(Some("Browse"), &body))
}

/// Query parameters for the collection page
#[derive(Debug, Deserialize)]
pub struct CollectionQuery {
    pub id: Option<String>,
}

/// GET /collection?id=<collection id or slug>
pub async fn collection_page(
    State(state): State<AppState>,
    Query(query): Query<CollectionQuery>,
) -> PageResult<Html<String>> {
    let id = query.id.as_deref().map(str::trim).unwrap_or_default();
    if id.is_empty() {
        return Err(ApiError::MissingCollection.into_page(&state.renderer));
    }

    let document = match state.source.fetch(id).await {
        Ok(document) => document,
        Err(e) => match find_by_slug(&state, id).await {
            Some(document) => document,
            None => {
                warn!(collection = %id, "Error loading collection: {}", e);
                return Err(ApiError::from(e).into_page(&state.renderer));
            }
        },
    };

    let body = state.renderer.collection(&document);
    Ok(Html(state.renderer.page(Some(&document.collection.title), &body)))
}

/// Configured collection whose link slug is `slug`
async fn find_by_slug(state: &AppState, slug: &str) -> Option<MetadataDocument> {
    for collection_id in state.site.collections.iter().filter(|c| c.as_str() != slug) {
        match state.source.fetch(collection_id).await {
            Ok(document) if document.collection.link_slug() == slug => return Some(document),
            Ok(_) => {}
            Err(e) => debug!(collection = %collection_id, "Skipped during slug lookup: {}", e),
        }
    }
    None
}
