//! HTTP routes for Lookout.
//!
//! This module combines all routes into a single router.
//! Routes are organized by page and apply appropriate middleware.

pub mod csrf;
pub mod flash;
pub mod forms;
mod home;
pub mod projects;
mod status;

use axum::Router;

use crate::AppState;

/// Build the complete router.
///
/// Route structure:
/// - / - Home page (session-protected)
/// - /account/teams/:team_slug/projects/:project_slug/edit - Project settings
///   (session + team owner access)
/// - /health, /health/ready - Health checks (public)
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(status::routes())
        .merge(home::routes(state.clone()))
        .merge(projects::routes(state))
}
