//! Shared fixtures for Lookout integration tests.
//!
//! Builds an application over a fresh in-memory database seeded with:
//! - `root` (superuser), `alice`, `bob`, `carol`
//! - team `acme` owned by alice; bob is a plain member, carol a member with owner access
//! - team `beta` owned by carol
//! - projects `acme/web` and `acme/api`
//! - a live session per user, plus an expired one for alice

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use tower::ServiceExt;

use lookout::config::Config;
use lookout::db::{self, DbPool};
use lookout::models::TeamAccess;
use lookout::services::PluginRegistry;
use lookout::AppState;

pub const CSRF_TOKEN: &str = "test-csrf-token-0123456789abcdef";
pub const WEB_SETTINGS: &str = "/account/teams/acme/projects/web/edit";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub acme_id: String,
    pub beta_id: String,
    pub web_id: String,
    pub api_id: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub set_cookies: Vec<String>,
    pub body: String,
}

impl TestResponse {
    /// `name=value` pair of a cookie set by the response.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.set_cookies
            .iter()
            .filter_map(|c| c.split(';').next())
            .find(|pair| pair.starts_with(&format!("{}=", name)))
            .map(str::to_string)
    }
}

/// Set up an application with default configuration.
pub async fn setup() -> TestApp {
    setup_with(Config::default()).await
}

/// Set up an application with the given configuration.
pub async fn setup_with(config: Config) -> TestApp {
    let pool = db::create_pool_with_config(":memory:", db::PoolConfig::test())
        .await
        .expect("Failed to init pool");
    db::initialize_schema(&pool)
        .await
        .expect("Failed to apply schema");

    let (acme_id, beta_id, web_id, api_id) = seed(&pool).await;

    let plugins = PluginRegistry::with_defaults(&config.projects);
    let state = AppState::from_parts(pool, config, plugins);
    let router = lookout::router(state.clone());

    TestApp {
        state,
        router,
        acme_id,
        beta_id,
        web_id,
        api_id,
    }
}

async fn seed(pool: &DbPool) -> (String, String, String, String) {
    for (id, username, role) in [
        ("u-root", "root", db::UserRole::Admin),
        ("u-alice", "alice", db::UserRole::Member),
        ("u-bob", "bob", db::UserRole::Member),
        ("u-carol", "carol", db::UserRole::Member),
    ] {
        db::create_user(
            pool,
            db::CreateUser {
                id: id.to_string(),
                username: username.to_string(),
                email: Some(format!("{}@example.com", username)),
                name: None,
                role,
            },
        )
        .await
        .expect("Failed to create user");

        db::create_session(
            pool,
            db::CreateSession {
                id: format!("session-{}", username),
                user_id: id.to_string(),
                expires_at: Utc::now() + Duration::days(1),
            },
        )
        .await
        .expect("Failed to create session");
    }

    db::create_session(
        pool,
        db::CreateSession {
            id: "session-expired".to_string(),
            user_id: "u-alice".to_string(),
            expires_at: Utc::now() - Duration::hours(1),
        },
    )
    .await
    .expect("Failed to create session");

    let acme = db::create_team(
        pool,
        db::CreateTeam {
            id: "t-acme".to_string(),
            slug: "acme".to_string(),
            name: "Acme".to_string(),
            owner_id: "u-alice".to_string(),
        },
    )
    .await
    .expect("Failed to create team");

    let beta = db::create_team(
        pool,
        db::CreateTeam {
            id: "t-beta".to_string(),
            slug: "beta".to_string(),
            name: "Beta".to_string(),
            owner_id: "u-carol".to_string(),
        },
    )
    .await
    .expect("Failed to create team");

    db::add_team_member(pool, &acme.id, "u-bob", TeamAccess::User)
        .await
        .expect("Failed to add member");
    db::add_team_member(pool, &acme.id, "u-carol", TeamAccess::Owner)
        .await
        .expect("Failed to add member");

    let web = db::create_project(
        pool,
        db::CreateProject {
            id: "p-web".to_string(),
            team_id: acme.id.clone(),
            slug: "web".to_string(),
            name: "Web".to_string(),
            owner_id: None,
        },
    )
    .await
    .expect("Failed to create project");

    let api = db::create_project(
        pool,
        db::CreateProject {
            id: "p-api".to_string(),
            team_id: acme.id.clone(),
            slug: "api".to_string(),
            name: "API".to_string(),
            owner_id: None,
        },
    )
    .await
    .expect("Failed to create project");

    (acme.id, beta.id, web.id, api.id)
}

impl TestApp {
    pub fn db(&self) -> &DbPool {
        &self.state.db
    }

    /// GET `uri` as `user` (a seeded username), with extra cookies.
    pub async fn get(&self, uri: &str, user: Option<&str>, cookies: &[String]) -> TestResponse {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie_header(user, cookies) {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// POST the settings form as `user` with a matching CSRF cookie and field.
    pub async fn post_form(&self, uri: &str, user: Option<&str>, fields: &[(&str, &str)]) -> TestResponse {
        let mut all: Vec<(&str, &str)> = fields.to_vec();
        all.push(("csrf_token", CSRF_TOKEN));
        self.post_raw(uri, user, &[format!("lookout_csrf={}", CSRF_TOKEN)], &all)
            .await
    }

    /// POST form fields verbatim.
    pub async fn post_raw(
        &self,
        uri: &str,
        user: Option<&str>,
        cookies: &[String],
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        self.post_body(
            uri,
            user,
            cookies,
            Some("application/x-www-form-urlencoded"),
            body,
        )
        .await
    }

    /// POST an arbitrary body, with an optional content type.
    pub async fn post_body(
        &self,
        uri: &str,
        user: Option<&str>,
        cookies: &[String],
        content_type: Option<&str>,
        body: String,
    ) -> TestResponse {
        let mut builder = Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(cookie) = cookie_header(user, cookies) {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let set_cookies = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            set_cookies,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

fn cookie_header(user: Option<&str>, cookies: &[String]) -> Option<String> {
    let mut pairs: Vec<String> = Vec::new();
    if let Some(user) = user {
        pairs.push(format!("lookout_session=session-{}", user));
    }
    pairs.extend(cookies.iter().cloned());

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// A complete, valid settings submission for `acme/web`.
pub fn valid_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Web"),
        ("slug", "web"),
        ("platform", "python"),
        ("team", "t-acme"),
        ("owner", ""),
        ("origins", "https://example.com\nhttp://*.example.org"),
        ("resolve_age", "30"),
        ("mail_subject_prefix", "[web] "),
    ]
}

/// Replace one field in a submission.
pub fn with_field(
    mut fields: Vec<(&'static str, &'static str)>,
    name: &'static str,
    value: &'static str,
) -> Vec<(&'static str, &'static str)> {
    fields.retain(|(k, _)| *k != name);
    fields.push((name, value));
    fields
}
