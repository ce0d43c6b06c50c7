//! Account route handlers.
//!
//! WordPress owns login. `/login` hands the shopper to `wp-login.php` with a
//! redirect back to the storefront; `/account` requires WordPress
//! credentials and asks WordPress who the viewer is.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, set_sentry_user};
use crate::middleware::auth::{RequireViewer, redirect_to_login};
use crate::models::{is_local_path, return_to};
use crate::routes::view::PageContext;
use crate::state::AppState;
use crate::wordpress::{Account, OrderSummary};

/// Viewer display data for templates.
#[derive(Clone)]
pub struct ViewerView {
    pub name: String,
    pub email: Option<String>,
}

/// Order display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub number: String,
    pub date: String,
    pub status: String,
    pub total: String,
}

impl From<&OrderSummary> for OrderView {
    fn from(order: &OrderSummary) -> Self {
        Self {
            number: order.number.clone(),
            date: order
                .date
                .as_deref()
                .map(|d| d.split('T').next().unwrap_or(d).to_string())
                .unwrap_or_default(),
            status: order
                .status
                .map_or_else(|| "Unknown".to_string(), |s| s.label().to_string()),
            total: order.total.clone(),
        }
    }
}

/// Account overview page template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub page: PageContext,
    pub viewer: ViewerView,
    pub orders: Vec<OrderView>,
}

impl AccountTemplate {
    fn new(page: PageContext, account: &Account) -> Self {
        Self {
            page,
            viewer: ViewerView {
                name: account.viewer.name.clone(),
                email: account.viewer.email.clone(),
            },
            orders: account.orders.iter().map(OrderView::from).collect(),
        }
    }
}

/// Display account overview page.
///
/// Credentials WordPress no longer accepts are treated as logged out.
#[instrument(skip(state, session, credentials))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireViewer(credentials): RequireViewer,
) -> Result<Response, AppError> {
    let Some(account) = state.wordpress().get_account(&credentials).await? else {
        return Ok(redirect_to_login(Some(&session), "/account")
            .await
            .into_response());
    };

    set_sentry_user(&account.viewer.id, account.viewer.email.as_deref());

    let page = PageContext::load(&state, &session, "Your account").await;
    Ok(AccountTemplate::new(page, &account).into_response())
}

/// Login query parameters.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

/// Send the shopper to the WordPress login form.
///
/// The return path comes from `?redirect=`, then the session, then `/`.
/// Only local paths are honoured.
#[instrument(skip(state, session))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<LoginQuery>,
) -> Redirect {
    let path = match query.redirect.filter(|r| is_local_path(r)) {
        Some(path) => path,
        None => return_to(&session).await.unwrap_or_else(|| "/".to_string()),
    };

    let config = state.config();
    let back = format!("{}{}", config.base_url.trim_end_matches('/'), path);
    Redirect::to(&config.wordpress.login_url(&back))
}
