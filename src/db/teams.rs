//! Team and team membership queries.
//!
//! Teams own projects. A team's `owner_id` implicitly holds owner access;
//! everyone else is listed in `team_members` with an access level.

use crate::models::TeamAccess;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::DbPool;

// ============================================================================
// Types
// ============================================================================

/// Team record from the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: String,
}

/// Input for creating a new team.
#[derive(Debug, Clone)]
pub struct CreateTeam {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub owner_id: String,
}

// ============================================================================
// Queries
// ============================================================================

/// Create a new team.
pub async fn create_team(pool: &DbPool, input: CreateTeam) -> Result<Team> {
    sqlx::query_as::<_, Team>(
        r#"
        INSERT INTO teams (id, slug, name, owner_id)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&input.id)
    .bind(&input.slug)
    .bind(&input.name)
    .bind(&input.owner_id)
    .fetch_one(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            Error::AlreadyExists(format!("Team with slug '{}' already exists", input.slug))
        }
        _ => Error::Database(e),
    })
}

/// Get a team by ID.
pub async fn get_team(pool: &DbPool, id: &str) -> Result<Team> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Team not found: {}", id)))
}

/// Get a team by slug.
pub async fn get_team_by_slug(pool: &DbPool, slug: &str) -> Result<Option<Team>> {
    sqlx::query_as::<_, Team>("SELECT * FROM teams WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(Error::Database)
}

/// Add a user to a team, or change their access if already a member.
pub async fn add_team_member(
    pool: &DbPool,
    team_id: &str,
    user_id: &str,
    access: TeamAccess,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO team_members (team_id, user_id, access)
        VALUES (?, ?, ?)
        ON CONFLICT (team_id, user_id) DO UPDATE SET access = excluded.access
        "#,
    )
    .bind(team_id)
    .bind(user_id)
    .bind(access.level())
    .execute(pool)
    .await?;

    Ok(())
}

/// Resolve the access a user holds on a team, if any.
pub async fn get_team_access(pool: &DbPool, team: &Team, user_id: &str) -> Result<Option<TeamAccess>> {
    if team.owner_id == user_id {
        return Ok(Some(TeamAccess::Owner));
    }

    let level: Option<i64> =
        sqlx::query_scalar("SELECT access FROM team_members WHERE team_id = ? AND user_id = ?")
            .bind(&team.id)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(level.and_then(TeamAccess::from_level))
}

/// List teams where the user holds at least `access`, ordered by name.
///
/// Covers both teams the user owns outright and teams where their
/// membership grants the required level.
pub async fn get_teams_for_user(pool: &DbPool, user_id: &str, access: TeamAccess) -> Result<Vec<Team>> {
    let teams = sqlx::query_as::<_, Team>(
        r#"
        SELECT DISTINCT t.* FROM teams t
        LEFT JOIN team_members tm ON tm.team_id = t.id AND tm.user_id = ?
        WHERE t.owner_id = ? OR tm.access <= ?
        ORDER BY t.name, t.slug
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .bind(access.level())
    .fetch_all(pool)
    .await?;

    Ok(teams)
}

/// List all teams, ordered by name.
pub async fn list_teams(pool: &DbPool) -> Result<Vec<Team>> {
    let teams = sqlx::query_as::<_, Team>("SELECT * FROM teams ORDER BY name, slug")
        .fetch_all(pool)
        .await?;

    Ok(teams)
}
