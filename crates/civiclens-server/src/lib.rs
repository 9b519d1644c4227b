#![forbid(unsafe_code)]
//! HTTP surface of the civic issue reporter. Routing and request shaping
//! live here; all storage behavior sits behind the store facade.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use civiclens_store::StoreFacade;
use std::sync::Arc;

pub mod config;
pub mod http;
mod middleware;

pub use config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StoreFacade>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<StoreFacade>, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(http::health_handler))
        .route("/api/mock-data", get(http::mock_data_handler))
        .route(
            "/api/admin/demo-mode",
            get(http::demo_mode_state_handler).post(http::demo_mode_override_handler),
        )
        .route(
            "/api/issues",
            get(http::list_issues_handler).post(http::create_issue_handler),
        )
        .route("/api/issues/:issue_id", get(http::get_issue_handler))
        .route("/api/issues/:issue_id/upvote", post(http::upvote_handler))
        .route(
            "/api/issues/:issue_id/resolve-vote",
            post(http::resolve_vote_handler),
        )
        .route(
            "/api/issues/:issue_id/comments",
            get(http::list_comments_handler).post(http::create_comment_handler),
        )
        .route("/api/stats", get(http::stats_handler))
        .route("/api/contacts", get(http::contacts_handler))
        .route("/api/hotlines", get(http::hotlines_handler))
        .layer(from_fn_with_state(state.clone(), middleware::cors_middleware))
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .with_state(state)
}
