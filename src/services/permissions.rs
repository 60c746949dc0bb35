//! Permission service for centralized access control.
//!
//! Handles checking if users may act on teams and projects based on:
//! - Team ownership and membership access levels
//! - Global superuser role (bypasses team checks)
//! - Permission plugins consulted for project-level actions

use std::sync::Arc;

use tracing::debug;

use crate::config::ProjectPolicyConfig;
use crate::db::{self, DbPool, Project, Team};
use crate::middleware::AuthUser;
use crate::models::{Action, PermissionResult, TeamAccess};
use crate::Result;

use super::PluginRegistry;

/// Service for checking permissions.
#[derive(Clone)]
pub struct PermissionService {
    db: DbPool,
    plugins: Arc<PluginRegistry>,
    policy: ProjectPolicyConfig,
}

impl PermissionService {
    /// Create a new permission service.
    pub fn new(db: DbPool, plugins: Arc<PluginRegistry>, policy: ProjectPolicyConfig) -> Self {
        Self { db, plugins, policy }
    }

    /// Check whether a user holds at least `required` on a team.
    ///
    /// Superusers pass every team check.
    pub async fn has_team_access(
        &self,
        user: &AuthUser,
        team: &Team,
        required: TeamAccess,
    ) -> Result<bool> {
        if user.is_superuser() {
            debug!(user_id = %user.user_id, team = %team.slug, "Superuser bypass: team access");
            return Ok(true);
        }

        let access = db::get_team_access(&self.db, team, &user.user_id).await?;
        let granted = access.is_some_and(|a| a.is_at_least(required));

        debug!(
            user_id = %user.user_id,
            team = %team.slug,
            access = ?access,
            required = ?required,
            granted = granted,
            "Checked team access"
        );

        Ok(granted)
    }

    /// Teams on which `user_id` holds at least `access`.
    ///
    /// Superusers are offered every team.
    pub async fn get_for_user(
        &self,
        user_id: &str,
        is_superuser: bool,
        access: TeamAccess,
    ) -> Result<Vec<Team>> {
        if is_superuser {
            return db::list_teams(&self.db).await;
        }
        db::get_teams_for_user(&self.db, user_id, access).await
    }

    /// Ask the permission plugins about an action on a project.
    pub async fn has_perm(
        &self,
        user: &AuthUser,
        action: Action,
        project: &Project,
    ) -> Result<PermissionResult> {
        self.plugins.first(user, action, project).await
    }

    /// Whether the user may remove the project.
    ///
    /// The internal project can never be removed. Otherwise superusers
    /// always may, and anyone else may unless a plugin denies it.
    pub async fn can_remove_project(&self, user: &AuthUser, project: &Project) -> Result<bool> {
        if self.policy.internal_project_slug.as_deref() == Some(project.slug.as_str()) {
            return Ok(false);
        }

        if user.is_superuser() {
            return Ok(true);
        }

        let result = self.has_perm(user, Action::RemoveProject, project).await?;
        Ok(result != PermissionResult::Deny)
    }

    /// Whether the user may mark projects public.
    pub fn can_set_public_projects(&self, user: &AuthUser) -> bool {
        self.policy.allow_public_projects || user.is_superuser()
    }
}
