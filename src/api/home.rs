//! Home page.
//!
//! Shows pending flash messages and the teams the user belongs to. Denied
//! requests elsewhere land here.

use axum::{
    extract::{Extension, State},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use axum_extra::extract::CookieJar;
use minijinja::context;

use super::flash;
use crate::middleware::{require_session, AuthUser};
use crate::models::TeamAccess;
use crate::{templates, AppState, Result};

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route_layer(axum::middleware::from_fn_with_state(state, require_session))
}

/// GET /
async fn home(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<Response> {
    let teams = state
        .permissions
        .get_for_user(&user.user_id, user.is_superuser(), TeamAccess::User)
        .await?;

    let (jar, messages) = flash::take(jar);

    let html = templates::render_template(
        "home.html",
        context! {
            user => context! { username => &user.username },
            teams => teams,
            messages => messages,
        },
    )?;

    Ok((jar, Html(html)).into_response())
}
