//! Application state for Lookout.
//!
//! Contains the shared state that is passed to all handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::db::DbPool;
use crate::services::{PermissionService, PluginRegistry};
use crate::Result;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: DbPool,
    /// Configuration snapshot.
    pub config: Arc<Config>,
    /// Permission plugins, resolved at startup.
    pub plugins: Arc<PluginRegistry>,
    /// Team and project permission checks.
    pub permissions: PermissionService,
}

impl AppState {
    /// Create a new application state from the global configuration,
    /// opening the database and applying the schema.
    pub async fn new() -> Result<Self> {
        let config = crate::config::config().clone();

        let db = crate::db::init_pool(&config.database.path).await?;
        crate::db::initialize_schema(&db).await?;

        let plugins = PluginRegistry::with_defaults(&config.projects);

        Ok(Self::from_parts(db, config, plugins))
    }

    /// Assemble state from already-initialized parts.
    pub fn from_parts(db: DbPool, config: Config, plugins: PluginRegistry) -> Self {
        let plugins = Arc::new(plugins);
        let permissions =
            PermissionService::new(db.clone(), plugins.clone(), config.projects.clone());

        tracing::debug!(plugins = ?plugins.slugs(), "Permission plugins registered");

        Self {
            db,
            config: Arc::new(config),
            plugins,
            permissions,
        }
    }
}
