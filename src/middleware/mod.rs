//! Middleware for Lookout.
//!
//! - `session_auth` - Session cookie validation for browser access
//! - `team_access` - Team/project resolution and team-level access control

mod session_auth;
mod team_access;

pub use session_auth::{require_session, validate_session, SESSION_COOKIE_NAME};
pub use team_access::{require_team_access, TeamProjectContext, TeamProjectParams};

use crate::db::{User, UserRole};

/// The authenticated requester, injected by `require_session`.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: String,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
}

impl From<User> for AuthUser {
    fn from(user: User) -> Self {
        AuthUser {
            user_id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

impl AuthUser {
    pub fn is_superuser(&self) -> bool {
        UserRole::from_str(&self.role) == UserRole::Admin
    }
}
