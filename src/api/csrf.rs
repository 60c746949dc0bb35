//! Double-submit CSRF protection for HTML forms.
//!
//! Rendering a form makes sure the `lookout_csrf` cookie exists and embeds
//! its value as a hidden `csrf_token` field; a POST is accepted only when the
//! two match.

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use tracing::warn;

use crate::{Error, Result};

/// CSRF cookie name.
pub const CSRF_COOKIE_NAME: &str = "lookout_csrf";

/// Return the current token, issuing a new cookie when there is none.
pub fn ensure_token(jar: CookieJar, secure: bool) -> (CookieJar, String) {
    if let Some(existing) = jar.get(CSRF_COOKIE_NAME) {
        if !existing.value().is_empty() {
            let token = existing.value().to_string();
            return (jar, token);
        }
    }

    let token = nanoid::nanoid!(32);
    let cookie = Cookie::build((CSRF_COOKIE_NAME, token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();

    (jar.add(cookie), token)
}

/// Check a submitted token against the cookie.
pub fn verify(jar: &CookieJar, submitted: Option<&str>) -> Result<()> {
    let expected = jar.get(CSRF_COOKIE_NAME).map(|c| c.value()).unwrap_or("");

    match submitted {
        Some(token) if !expected.is_empty() && constant_time_eq(token, expected) => Ok(()),
        _ => {
            warn!("CSRF token missing or mismatched");
            Err(Error::CsrfFailed)
        }
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_reused() {
        let (jar, first) = ensure_token(CookieJar::new(), false);
        assert_eq!(first.len(), 32);
        let (_, second) = ensure_token(jar, false);
        assert_eq!(first, second);
    }

    #[test]
    fn test_verify() {
        let (jar, token) = ensure_token(CookieJar::new(), false);
        assert!(verify(&jar, Some(&token)).is_ok());
        assert!(matches!(verify(&jar, Some("nope")), Err(Error::CsrfFailed)));
        assert!(matches!(verify(&jar, None), Err(Error::CsrfFailed)));
        assert!(matches!(verify(&CookieJar::new(), Some("")), Err(Error::CsrfFailed)));
    }
}
