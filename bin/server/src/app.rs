//! Router assembly.

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState, routes::CALLBACK_PATH};
use crate::pages;

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/admin", get(pages::admin))
        .route("/healthz", get(pages::healthz))
        // Auth routes
        .route("/login", get(auth::login))
        .route(CALLBACK_PATH, get(auth::callback))
        .route("/logout", get(auth::logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
