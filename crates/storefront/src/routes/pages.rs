//! CMS page route handlers.
//!
//! Any path no other route claims is looked up as a WordPress page URI.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::{instrument, warn};

use crate::error::AppError;
use crate::routes::view::PageContext;
use crate::state::AppState;

/// CMS page template.
#[derive(Template, WebTemplate)]
#[template(path = "page.html")]
pub struct ContentPageTemplate {
    pub page: PageContext,
    /// Page HTML from WordPress.
    pub content_html: String,
}

/// 404 template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub page: PageContext,
}

/// Render the 404 page.
pub async fn not_found(state: &AppState, session: &Session) -> Response {
    let page = PageContext::load(state, session, "Not found").await;
    (StatusCode::NOT_FOUND, NotFoundTemplate { page }).into_response()
}

/// Serve a WordPress page for an otherwise unrouted path.
#[instrument(skip(state, session), fields(path = %uri.path()))]
pub async fn fallback(State(state): State<AppState>, session: Session, uri: Uri) -> Response {
    let path = uri.path();
    if path.starts_with("/api/") || path.starts_with("/static/") {
        return not_found(&state, &session).await;
    }

    match state.wordpress().get_page(path).await {
        Ok(Some(cms)) => {
            let page = PageContext::load(&state, &session, cms.title).await;
            ContentPageTemplate {
                page,
                content_html: cms.content,
            }
            .into_response()
        }
        Ok(None) => not_found(&state, &session).await,
        Err(e) => {
            warn!(error = %e, "Page lookup failed");
            AppError::from(e).into_response()
        }
    }
}
