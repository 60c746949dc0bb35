//! Session-based authentication middleware.
//!
//! Identifies the browser from the `lookout_session` cookie. Sessions are
//! issued by the account system; this module only validates them.
//!
//! # Session Flow
//!
//! 1. The account system creates a session row and sets the cookie
//! 2. Subsequent requests carry the cookie, validated by this middleware
//! 3. Expired or unknown sessions are sent to the login page

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::{db, error::Error, AppState};

use super::AuthUser;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "lookout_session";

/// Middleware that requires a valid session.
///
/// Injects `AuthUser` into request extensions. Requests without a valid
/// session are redirected to the configured login URL with a `next`
/// parameter pointing back at the requested page.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Error> {
    let session_id = jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string());

    let user = match session_id {
        Some(session_id) => validate_session(&state, &session_id).await?,
        None => None,
    };

    let Some(user) = user else {
        let target = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());
        debug!(path = %target, "No valid session, redirecting to login");
        return Ok(Redirect::to(&login_redirect_url(&state.config.session.login_url, &target))
            .into_response());
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Resolve a session ID to its user.
///
/// Returns `None` for unknown or expired sessions. Expired sessions are
/// deleted in the background.
pub async fn validate_session(state: &AppState, session_id: &str) -> Result<Option<AuthUser>, Error> {
    let Some(session) = db::get_session(&state.db, session_id).await? else {
        return Ok(None);
    };

    if session.is_expired() {
        let pool = state.db.clone();
        let sid = session.id.clone();
        tokio::spawn(async move {
            let _ = db::delete_session(&pool, &sid).await;
        });
        return Ok(None);
    }

    match db::get_user(&state.db, &session.user_id).await {
        Ok(user) => Ok(Some(user.into())),
        Err(Error::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

fn login_redirect_url(login_url: &str, next: &str) -> String {
    format!("{}?next={}", login_url, urlencoding::encode(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_url_encodes_next() {
        assert_eq!(
            login_redirect_url("/login", "/account/teams/a/projects/b/edit?x=1"),
            "/login?next=%2Faccount%2Fteams%2Fa%2Fprojects%2Fb%2Fedit%3Fx%3D1"
        );
    }
}
