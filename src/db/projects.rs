//! Project database queries.
//!
//! Projects belong to a team and are addressed by a slug unique within it.

use crate::models::ProjectStatus;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;

// ============================================================================
// Types
// ============================================================================

/// Project record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: String,
    pub team_id: String,
    pub slug: String,
    pub name: String,
    pub platform: Option<String>,
    pub public: bool,
    pub owner_id: Option<String>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Project {
    pub fn status_enum(&self) -> ProjectStatus {
        ProjectStatus::from_str(&self.status)
    }
}

/// Input for creating a new project.
#[derive(Debug, Clone)]
pub struct CreateProject {
    pub id: String,
    pub team_id: String,
    pub slug: String,
    pub name: String,
    pub owner_id: Option<String>,
}

/// Full replacement of the editable project columns.
///
/// Every field is written; `None` clears nullable columns.
#[derive(Debug, Clone)]
pub struct ProjectChanges {
    pub team_id: String,
    pub slug: String,
    pub name: String,
    pub platform: Option<String>,
    pub public: bool,
    pub owner_id: Option<String>,
}

// ============================================================================
// Queries
// ============================================================================

/// Create a new project.
pub async fn create_project(pool: &DbPool, input: CreateProject) -> Result<Project> {
    sqlx::query_as::<_, Project>(
        r#"
        INSERT INTO projects (id, team_id, slug, name, owner_id)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&input.id)
    .bind(&input.team_id)
    .bind(&input.slug)
    .bind(&input.name)
    .bind(&input.owner_id)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            Error::AlreadyExists(format!("Project with slug '{}' already exists", input.slug))
        }
        _ => Error::Database(e),
    })
}

/// Get a project by ID.
pub async fn get_project(pool: &DbPool, id: &str) -> Result<Project> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Project not found: {}", id)))
}

/// Get a project by slug within a team.
/// Uses the (team_id, slug) unique index.
pub async fn get_project_by_slug(pool: &DbPool, team_id: &str, slug: &str) -> Result<Option<Project>> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE team_id = ? AND slug = ?")
        .bind(team_id)
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// Check whether another project in the team already uses `slug`.
pub async fn project_slug_taken(
    pool: &DbPool,
    team_id: &str,
    slug: &str,
    exclude_project_id: &str,
) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM projects WHERE team_id = ? AND slug = ? AND id != ?",
    )
    .bind(team_id)
    .bind(slug)
    .bind(exclude_project_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Write the editable columns of a project and bump `updated_at`.
pub async fn update_project(pool: &DbPool, id: &str, changes: &ProjectChanges) -> Result<Project> {
    sqlx::query_as::<_, Project>(
        r#"
        UPDATE projects
        SET team_id = ?, slug = ?, name = ?, platform = ?, public = ?, owner_id = ?,
            updated_at = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&changes.team_id)
    .bind(&changes.slug)
    .bind(&changes.name)
    .bind(&changes.platform)
    .bind(changes.public)
    .bind(&changes.owner_id)
    .bind(crate::models::now().format("%Y-%m-%dT%H:%M:%SZ").to_string())
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            Error::AlreadyExists(format!("Project with slug '{}' already exists", changes.slug))
        }
        _ => Error::Database(e),
    })?
    .ok_or_else(|| Error::NotFound(format!("Project not found: {}", id)))
}

/// Set a project's lifecycle status.
pub async fn set_project_status(pool: &DbPool, id: &str, status: ProjectStatus) -> Result<()> {
    let result = sqlx::query("UPDATE projects SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Project not found: {}", id)));
    }

    Ok(())
}
