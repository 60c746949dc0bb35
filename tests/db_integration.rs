//! Database and permission service tests over the seeded fixture.

mod common;

use serde_json::json;

use common::setup;
use lookout::db;
use lookout::middleware::AuthUser;
use lookout::models::{Action, PermissionResult, ProjectStatus, TeamAccess};

fn auth(user_id: &str, username: &str, role: &str) -> AuthUser {
    AuthUser {
        user_id: user_id.to_string(),
        username: username.to_string(),
        email: None,
        role: role.to_string(),
    }
}

#[tokio::test]
async fn test_teams_for_user_by_access_level() {
    let app = setup().await;

    let slugs = |teams: Vec<db::Team>| teams.into_iter().map(|t| t.slug).collect::<Vec<_>>();

    let owned = db::get_teams_for_user(app.db(), "u-carol", TeamAccess::Owner)
        .await
        .unwrap();
    assert_eq!(slugs(owned), vec!["acme", "beta"]);

    let owned = db::get_teams_for_user(app.db(), "u-bob", TeamAccess::Owner)
        .await
        .unwrap();
    assert!(owned.is_empty());

    let member = db::get_teams_for_user(app.db(), "u-bob", TeamAccess::User)
        .await
        .unwrap();
    assert_eq!(slugs(member), vec!["acme"]);
}

#[tokio::test]
async fn test_team_access_resolution() {
    let app = setup().await;
    let acme = db::get_team(app.db(), &app.acme_id).await.unwrap();

    assert_eq!(
        db::get_team_access(app.db(), &acme, "u-alice").await.unwrap(),
        Some(TeamAccess::Owner)
    );
    assert_eq!(
        db::get_team_access(app.db(), &acme, "u-bob").await.unwrap(),
        Some(TeamAccess::User)
    );
    assert_eq!(
        db::get_team_access(app.db(), &acme, "u-root").await.unwrap(),
        None
    );

    // Re-adding a member updates their access.
    db::add_team_member(app.db(), &acme.id, "u-bob", TeamAccess::Owner)
        .await
        .unwrap();
    assert_eq!(
        db::get_team_access(app.db(), &acme, "u-bob").await.unwrap(),
        Some(TeamAccess::Owner)
    );
}

#[tokio::test]
async fn test_option_upsert_and_project_options() {
    let app = setup().await;

    assert_eq!(
        db::get_option(app.db(), &app.web_id, "core:resolve_age").await.unwrap(),
        None
    );

    db::update_option(app.db(), &app.web_id, "core:resolve_age", &json!(10))
        .await
        .unwrap();
    db::update_option(app.db(), &app.web_id, "core:resolve_age", &json!(20))
        .await
        .unwrap();
    db::update_option(app.db(), &app.web_id, "core:origins", &json!(["*"]))
        .await
        .unwrap();

    let all = db::list_options(app.db(), &app.web_id).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all.get("core:resolve_age"), Some(&json!(20)));

    let options = db::get_project_options(app.db(), &app.web_id).await.unwrap();
    assert_eq!(options.resolve_age_or_default(), 20);
    assert_eq!(options.origins_or_empty(), ["*".to_string()]);
    assert_eq!(options.mail_subject_prefix_or("[Lookout] "), "[Lookout] ");

    // Options are per project.
    assert!(db::list_options(app.db(), &app.api_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_slug_taken_excludes_self() {
    let app = setup().await;

    assert!(db::project_slug_taken(app.db(), &app.acme_id, "api", &app.web_id)
        .await
        .unwrap());
    assert!(!db::project_slug_taken(app.db(), &app.acme_id, "web", &app.web_id)
        .await
        .unwrap());
    assert!(!db::project_slug_taken(app.db(), &app.beta_id, "api", &app.web_id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_update_project_replaces_editable_fields() {
    let app = setup().await;
    let project = db::get_project(app.db(), &app.web_id).await.unwrap();

    let changes = db::ProjectChanges {
        team_id: project.team_id.clone(),
        slug: project.slug.clone(),
        name: "Storefront".to_string(),
        platform: Some("javascript".to_string()),
        public: project.public,
        owner_id: Some("u-bob".to_string()),
    };

    let updated = db::update_project(app.db(), &app.web_id, &changes).await.unwrap();
    assert_eq!(updated.name, "Storefront");
    assert_eq!(updated.platform.as_deref(), Some("javascript"));
    assert_eq!(updated.owner_id.as_deref(), Some("u-bob"));
    assert_eq!(updated.slug, "web");
    assert_eq!(updated.created_at, project.created_at);
}

#[tokio::test]
async fn test_session_lookup() {
    let app = setup().await;

    let session = db::get_session(app.db(), "session-alice").await.unwrap().unwrap();
    assert!(!session.is_expired());

    let expired = db::get_session(app.db(), "session-expired").await.unwrap().unwrap();
    assert!(expired.is_expired());

    db::delete_session(app.db(), "session-expired").await.unwrap();
    assert!(db::get_session(app.db(), "session-expired").await.unwrap().is_none());
}

#[tokio::test]
async fn test_permission_service_team_access() {
    let app = setup().await;
    let perms = &app.state.permissions;
    let acme = db::get_team(app.db(), &app.acme_id).await.unwrap();

    let alice = auth("u-alice", "alice", "member");
    let bob = auth("u-bob", "bob", "member");
    let root = auth("u-root", "root", "admin");

    assert!(perms.has_team_access(&alice, &acme, TeamAccess::Owner).await.unwrap());
    assert!(!perms.has_team_access(&bob, &acme, TeamAccess::Owner).await.unwrap());
    assert!(perms.has_team_access(&bob, &acme, TeamAccess::User).await.unwrap());
    assert!(perms.has_team_access(&root, &acme, TeamAccess::Owner).await.unwrap());

    let all = perms.get_for_user("u-root", true, TeamAccess::Owner).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_permission_service_project_checks() {
    let app = setup().await;
    let perms = &app.state.permissions;
    let alice = auth("u-alice", "alice", "member");
    let root = auth("u-root", "root", "admin");

    let project = db::get_project(app.db(), &app.web_id).await.unwrap();
    assert_eq!(
        perms.has_perm(&alice, Action::EditProject, &project).await.unwrap(),
        PermissionResult::Abstain
    );
    assert!(perms.can_remove_project(&alice, &project).await.unwrap());

    db::set_project_status(app.db(), &app.web_id, ProjectStatus::DeletionInProgress)
        .await
        .unwrap();
    let project = db::get_project(app.db(), &app.web_id).await.unwrap();
    assert_eq!(
        perms.has_perm(&alice, Action::EditProject, &project).await.unwrap(),
        PermissionResult::Deny
    );
    assert!(perms.can_remove_project(&root, &project).await.unwrap());
}

#[tokio::test]
async fn test_bare_text_option_reads_as_string() {
    let app = setup().await;
    sqlx::query("INSERT INTO project_options (project_id, key, value) VALUES (?, ?, ?)")
        .bind(&app.web_id)
        .bind("core:origins")
        .bind("http://a.com\nhttp://b.com")
        .execute(app.db())
        .await
        .unwrap();

    assert_eq!(
        db::get_option(app.db(), &app.web_id, "core:origins").await.unwrap(),
        Some(json!("http://a.com\nhttp://b.com"))
    );
    assert_eq!(db::list_options(app.db(), &app.web_id).await.unwrap().len(), 1);

    let options = db::get_project_options(app.db(), &app.web_id).await.unwrap();
    assert_eq!(
        options.origins_or_empty(),
        ["http://a.com".to_string(), "http://b.com".to_string()]
    );
}
