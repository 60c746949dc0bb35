//! One-time flash messages.
//!
//! Messages are queued in the `lookout_messages` cookie (URL-safe base64 of a
//! JSON list) and consumed by the next page that renders them.

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Flash cookie name.
pub const FLASH_COOKIE_NAME: &str = "lookout_messages";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

/// Queue a message for the next rendered page.
pub fn push(jar: CookieJar, level: FlashLevel, message: &str, secure: bool) -> CookieJar {
    let mut messages = read(&jar);
    messages.push(FlashMessage {
        level,
        message: message.to_string(),
    });

    let Ok(json) = serde_json::to_vec(&messages) else {
        return jar;
    };

    let cookie = Cookie::build((FLASH_COOKIE_NAME, URL_SAFE_NO_PAD.encode(json)))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build();

    jar.add(cookie)
}

/// Take all queued messages, clearing the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<FlashMessage>) {
    let messages = read(&jar);
    if messages.is_empty() && jar.get(FLASH_COOKIE_NAME).is_none() {
        return (jar, messages);
    }

    let cookie = Cookie::build((FLASH_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();

    (jar.add(cookie), messages)
}

/// Decode queued messages. A malformed cookie reads as empty.
fn read(jar: &CookieJar) -> Vec<FlashMessage> {
    jar.get(FLASH_COOKIE_NAME)
        .and_then(|c| URL_SAFE_NO_PAD.decode(c.value()).ok())
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_then_take() {
        let jar = CookieJar::new();
        let jar = push(jar, FlashLevel::Success, "Saved.", false);
        let jar = push(jar, FlashLevel::Error, "But also this.", false);

        let (jar, messages) = take(jar);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].level, FlashLevel::Success);
        assert_eq!(messages[0].message, "Saved.");
        assert_eq!(messages[1].level, FlashLevel::Error);

        let (_, again) = take(jar);
        assert!(again.is_empty());
    }

    #[test]
    fn test_garbage_cookie_reads_as_empty() {
        let jar = CookieJar::new().add(Cookie::new(FLASH_COOKIE_NAME, "%%%not-base64"));
        let (_, messages) = take(jar);
        assert!(messages.is_empty());
    }
}
