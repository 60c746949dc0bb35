//! Project settings page.
//!
//! Routes:
//! - GET /account/teams/:team_slug/projects/:project_slug/edit - Render the settings form
//! - POST /account/teams/:team_slug/projects/:project_slug/edit - Save the settings form
//!
//! Both require a session and owner access to the team. A permission plugin
//! denying `edit_project` sends non-superusers back to the home page.

use axum::{
    extract::{rejection::FormRejection, Extension, Form, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::CookieJar;
use minijinja::context;
use tracing::{debug, info, warn};

use super::csrf;
use super::flash::{self, FlashLevel};
use super::forms::{EditProjectForm, EditProjectInput};
use crate::db::{self, Project, Team};
use crate::middleware::{require_session, require_team_access, AuthUser, TeamProjectContext};
use crate::models::{Action, PermissionResult, TeamAccess};
use crate::{templates, AppState, Result};

/// Build project settings routes.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/account/teams/:team_slug/projects/:project_slug/edit",
            get(manage_project).post(update_project),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_team_access,
        ))
        .route_layer(axum::middleware::from_fn_with_state(state, require_session))
}

/// Canonical URL of a project's settings page.
pub fn manage_project_url(team_slug: &str, project_slug: &str) -> String {
    format!("/account/teams/{}/projects/{}/edit", team_slug, project_slug)
}

// ============================================================================
// Handlers
// ============================================================================

/// Render the settings form from stored state.
///
/// GET /account/teams/:team_slug/projects/:project_slug/edit
#[axum::debug_handler(state = AppState)]
async fn manage_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(ctx): Extension<TeamProjectContext>,
    jar: CookieJar,
) -> Result<Response> {
    if let Some(denied) = deny_edit(&state, &user, &ctx.project).await? {
        return Ok(denied);
    }

    let form = initial_form(&state, &user, &ctx).await?;
    render_manage_page(&state, &user, &ctx, form, jar).await
}

/// Validate and save the settings form.
///
/// POST /account/teams/:team_slug/projects/:project_slug/edit
///
/// A valid submission saves the project and its options and redirects back
/// to the (possibly renamed) settings page. An invalid one re-renders the
/// form with field errors. A body that cannot be decoded at all re-renders
/// the stored values with a form-level error.
#[axum::debug_handler(state = AppState)]
async fn update_project(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Extension(ctx): Extension<TeamProjectContext>,
    jar: CookieJar,
    body: std::result::Result<Form<EditProjectInput>, FormRejection>,
) -> Result<Response> {
    if let Some(denied) = deny_edit(&state, &user, &ctx.project).await? {
        return Ok(denied);
    }

    let input = match body {
        Ok(Form(input)) => input,
        Err(rejection) => {
            debug!(
                project_id = %ctx.project.id,
                error = %rejection,
                "Project settings body unreadable"
            );
            let mut form = initial_form(&state, &user, &ctx).await?;
            form.add_form_error("The submitted form could not be read. Please try again.");
            return render_manage_page(&state, &user, &ctx, form, jar).await;
        }
    };

    csrf::verify(&jar, input.csrf_token.as_deref())?;

    let team_list = candidate_teams(&state, &user, &ctx.project).await?;
    let mut form = EditProjectForm::bind(
        input,
        &ctx.team,
        &team_list,
        state.permissions.can_set_public_projects(&user),
    );

    let Some(cleaned) = form.clean(&state.db, &ctx.project).await? else {
        debug!(
            project_id = %ctx.project.id,
            fields = ?form.errors.keys().collect::<Vec<_>>(),
            "Project settings form invalid"
        );
        return render_manage_page(&state, &user, &ctx, form, jar).await;
    };

    let project = cleaned.save(&state.db, &ctx.project.id).await?;
    let team = if project.team_id == ctx.team.id {
        ctx.team.clone()
    } else {
        db::get_team(&state.db, &project.team_id).await?
    };

    info!(
        project_id = %project.id,
        team = %team.slug,
        project = %project.slug,
        user_id = %user.user_id,
        "Project settings saved"
    );

    let jar = flash::push(
        jar,
        FlashLevel::Success,
        "Changes to your project were saved.",
        state.config.session.secure_cookies,
    );

    Ok((jar, Redirect::to(&manage_project_url(&team.slug, &project.slug))).into_response())
}

// ============================================================================
// Helpers
// ============================================================================

/// Redirect home when a plugin denies `edit_project` to a non-superuser.
async fn deny_edit(state: &AppState, user: &AuthUser, project: &Project) -> Result<Option<Response>> {
    let result = state
        .permissions
        .has_perm(user, Action::EditProject, project)
        .await?;

    if result == PermissionResult::Deny && !user.is_superuser() {
        warn!(
            user_id = %user.user_id,
            project_id = %project.id,
            "Access denied: edit_project refused by permission plugin"
        );
        return Ok(Some(Redirect::to("/").into_response()));
    }

    Ok(None)
}

/// The form pre-filled from the stored project and options.
async fn initial_form(
    state: &AppState,
    user: &AuthUser,
    ctx: &TeamProjectContext,
) -> Result<EditProjectForm> {
    let team_list = candidate_teams(state, user, &ctx.project).await?;
    let options = db::get_project_options(&state.db, &ctx.project.id).await?;
    let owner_username = match &ctx.project.owner_id {
        Some(owner_id) => Some(db::get_user(&state.db, owner_id).await?.username),
        None => None,
    };

    Ok(EditProjectForm::initial(
        &ctx.project,
        &ctx.team,
        &team_list,
        owner_username.as_deref(),
        &options,
        &state.config.mail.subject_prefix,
        state.permissions.can_set_public_projects(user),
    ))
}

/// Teams the project's owner (or, without one, the requester) owns.
async fn candidate_teams(state: &AppState, user: &AuthUser, project: &Project) -> Result<Vec<Team>> {
    match &project.owner_id {
        Some(owner_id) if *owner_id != user.user_id => {
            let owner = db::get_user(&state.db, owner_id).await?;
            state
                .permissions
                .get_for_user(&owner.id, owner.is_superuser(), TeamAccess::Owner)
                .await
        }
        _ => {
            state
                .permissions
                .get_for_user(&user.user_id, user.is_superuser(), TeamAccess::Owner)
                .await
        }
    }
}

async fn render_manage_page(
    state: &AppState,
    user: &AuthUser,
    ctx: &TeamProjectContext,
    form: EditProjectForm,
    jar: CookieJar,
) -> Result<Response> {
    let can_remove_project = state
        .permissions
        .can_remove_project(user, &ctx.project)
        .await?;

    let (jar, messages) = flash::take(jar);
    let (jar, csrf_token) = csrf::ensure_token(jar, state.config.session.secure_cookies);

    let html = templates::render_template(
        "projects/manage.html",
        context! {
            user => context! { username => &user.username },
            team => &ctx.team,
            project => &ctx.project,
            form => &form,
            can_remove_project => can_remove_project,
            page => "details",
            messages => messages,
            csrf_token => csrf_token,
        },
    )?;

    Ok((jar, Html(html)).into_response())
}
