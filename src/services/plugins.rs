//! Permission plugins.
//!
//! A plugin may answer `has_perm(user, action, project)` with an explicit
//! allow or deny, or abstain. The registry is assembled once at startup and
//! asks plugins in registration order; the first non-abstaining answer wins.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::ProjectPolicyConfig;
use crate::db::Project;
use crate::middleware::AuthUser;
use crate::models::{Action, PermissionResult};
use crate::Result;

/// A pluggable permission check.
#[async_trait]
pub trait PermissionPlugin: Send + Sync {
    /// Stable identifier, used in logs.
    fn slug(&self) -> &'static str;

    async fn has_perm(
        &self,
        user: &AuthUser,
        action: Action,
        project: &Project,
    ) -> Result<PermissionResult>;
}

/// Ordered set of permission plugins.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn PermissionPlugin>>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in plugins enabled by `policy`.
    pub fn with_defaults(policy: &ProjectPolicyConfig) -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(ProjectStatusPlugin));

        if !policy.locked_projects.is_empty() {
            registry.register(Arc::new(LockedProjectsPlugin::new(
                policy.locked_projects.iter().cloned(),
            )));
        }

        registry
    }

    /// Register a plugin after the existing ones.
    pub fn register(&mut self, plugin: Arc<dyn PermissionPlugin>) {
        self.plugins.push(plugin);
    }

    /// Registered plugin slugs, in consultation order.
    pub fn slugs(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.slug()).collect()
    }

    /// First explicit answer from the registered plugins, or `Abstain`.
    pub async fn first(
        &self,
        user: &AuthUser,
        action: Action,
        project: &Project,
    ) -> Result<PermissionResult> {
        for plugin in &self.plugins {
            let result = plugin.has_perm(user, action, project).await?;
            if result != PermissionResult::Abstain {
                debug!(
                    plugin = plugin.slug(),
                    action = action.as_str(),
                    project_id = %project.id,
                    user_id = %user.user_id,
                    result = ?result,
                    "Permission plugin answered"
                );
                return Ok(result);
            }
        }

        Ok(PermissionResult::Abstain)
    }
}

/// Refuses edits to projects that are being deleted.
pub struct ProjectStatusPlugin;

#[async_trait]
impl PermissionPlugin for ProjectStatusPlugin {
    fn slug(&self) -> &'static str {
        "project-status"
    }

    async fn has_perm(
        &self,
        _user: &AuthUser,
        action: Action,
        project: &Project,
    ) -> Result<PermissionResult> {
        if action == Action::EditProject && project.status_enum().is_being_deleted() {
            return Ok(PermissionResult::Deny);
        }
        Ok(PermissionResult::Abstain)
    }
}

/// Freezes the settings of an operator-chosen set of projects.
pub struct LockedProjectsPlugin {
    slugs: HashSet<String>,
}

impl LockedProjectsPlugin {
    pub fn new(slugs: impl IntoIterator<Item = String>) -> Self {
        Self {
            slugs: slugs.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PermissionPlugin for LockedProjectsPlugin {
    fn slug(&self) -> &'static str {
        "locked-projects"
    }

    async fn has_perm(
        &self,
        _user: &AuthUser,
        _action: Action,
        project: &Project,
    ) -> Result<PermissionResult> {
        if self.slugs.contains(&project.slug) {
            Ok(PermissionResult::Deny)
        } else {
            Ok(PermissionResult::Abstain)
        }
    }
}
