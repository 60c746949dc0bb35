//! Team-level access control middleware.
//!
//! Resolves the team and project named in the path and checks the
//! requester's access to the team before the handler runs.

use axum::{
    body::Body,
    extract::{Path, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::api::flash::{self, FlashLevel};
use crate::db::{self, Project, Team};
use crate::models::TeamAccess;
use crate::{error::Error, AppState};

use super::AuthUser;

/// Team and project resolved from the path, injected into request extensions.
#[derive(Clone, Debug)]
pub struct TeamProjectContext {
    pub team: Team,
    pub project: Project,
}

/// Path parameters identifying a project within a team.
#[derive(Debug, Deserialize)]
pub struct TeamProjectParams {
    pub team_slug: String,
    pub project_slug: String,
}

/// Middleware that requires owner access to the team in the path.
///
/// Must run after `require_session`.
///
/// # Errors
///
/// Returns 404 Not Found if the team or project does not exist.
/// Users without owner access (and who are not superusers) are redirected
/// to the home page with an error message instead.
pub async fn require_team_access(
    State(state): State<AppState>,
    Path(params): Path<TeamProjectParams>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Error> {
    let user = req
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or(Error::Unauthenticated)?;

    let team = db::get_team_by_slug(&state.db, &params.team_slug)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Team not found: {}", params.team_slug)))?;

    if !state
        .permissions
        .has_team_access(&user, &team, TeamAccess::Owner)
        .await?
    {
        warn!(
            user_id = %user.user_id,
            team = %team.slug,
            "Access denied: user lacks owner access to team"
        );
        let jar = flash::push(
            jar,
            FlashLevel::Error,
            "You do not have access to that team.",
            state.config.session.secure_cookies,
        );
        return Ok((jar, Redirect::to("/")).into_response());
    }

    let project = db::get_project_by_slug(&state.db, &team.id, &params.project_slug)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Project not found: {}", params.project_slug)))?;

    debug!(team = %team.slug, project = %project.slug, user_id = %user.user_id, "Team access granted");

    req.extensions_mut().insert(TeamProjectContext { team, project });
    Ok(next.run(req).await)
}
