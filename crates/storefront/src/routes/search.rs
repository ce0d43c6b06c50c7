//! Search route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::routes::view::PageContext;
use crate::search::{DEFAULT_LIMIT, SearchHit, SearchResults};
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

impl SearchQuery {
    /// Requested hit count, capped at 50.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 50)
    }
}

/// Search results page template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchPageTemplate {
    pub page: PageContext,
    pub query: String,
    pub hits: Vec<SearchHit>,
    pub total: usize,
    pub failed: bool,
}

/// Display the search page.
///
/// Backend failures render an empty result list with a notice.
#[instrument(skip(state, session))]
pub async fn search_page(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let (results, failed) = match state.search().search(&query.q, query.limit()).await {
        Ok(results) => (results, false),
        Err(e) => {
            warn!(error = %e, "Search failed");
            (SearchResults::empty(&query.q), true)
        }
    };

    SearchPageTemplate {
        page: PageContext::load(&state, &session, "Search").await,
        query: results.query,
        hits: results.hits,
        total: results.total,
        failed,
    }
}
