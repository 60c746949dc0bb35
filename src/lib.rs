//! Lookout - project settings service
//!
//! Library exports for the server binary and for tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod templates;

use axum::Router;
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

pub use config::config;
pub use error::{Error, Result};
pub use state::AppState;

/// Build the application router with its shared layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(api::routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The router wrapped so `/path/` and `/path` reach the same route.
pub fn app(state: AppState) -> tower_http::normalize_path::NormalizePath<Router> {
    tower::Layer::layer(&NormalizePathLayer::trim_trailing_slash(), router(state))
}
