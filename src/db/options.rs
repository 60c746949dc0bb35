//! Per-project option store.
//!
//! An open `key -> JSON value` map scoped to a project. Writes are single
//! upserts with no surrounding transaction.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::models::{OptionKey, ProjectOptions};
use crate::Result;

use super::DbPool;

/// Read one option, or `None` when unset.
pub async fn get_option(pool: &DbPool, project_id: &str, key: &str) -> Result<Option<Value>> {
    let raw: Option<String> =
        sqlx::query_scalar("SELECT value FROM project_options WHERE project_id = ? AND key = ?")
            .bind(project_id)
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(raw.map(|s| decode_stored(key, &s)))
}

/// Insert or overwrite one option.
pub async fn update_option(pool: &DbPool, project_id: &str, key: &str, value: &Value) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO project_options (project_id, key, value)
        VALUES (?, ?, ?)
        ON CONFLICT (project_id, key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(project_id)
    .bind(key)
    .bind(value.to_string())
    .execute(pool)
    .await?;

    debug!(project_id = %project_id, key = %key, "Updated project option");

    Ok(())
}

/// Read every option stored for a project, keyed by storage key.
pub async fn list_options(pool: &DbPool, project_id: &str) -> Result<BTreeMap<String, Value>> {
    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT key, value FROM project_options WHERE project_id = ?")
            .bind(project_id)
            .fetch_all(pool)
            .await?;

    let mut options = BTreeMap::new();
    for (key, raw) in rows {
        let value = decode_stored(&key, &raw);
        options.insert(key, value);
    }

    Ok(options)
}

/// Decode a stored value. Rows written by other tools may hold bare text
/// rather than JSON; those read as a JSON string.
fn decode_stored(key: &str, raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        debug!(key = %key, error = %e, "Option value is not JSON, reading as text");
        Value::String(raw.to_string())
    })
}

/// Load the options the settings page understands.
pub async fn get_project_options(pool: &DbPool, project_id: &str) -> Result<ProjectOptions> {
    let origins = get_option(pool, project_id, OptionKey::Origins.storage_key()).await?;
    let resolve_age = get_option(pool, project_id, OptionKey::ResolveAge.storage_key()).await?;
    let prefix = get_option(pool, project_id, OptionKey::MailSubjectPrefix.storage_key()).await?;

    Ok(ProjectOptions::from_values(
        origins.as_ref(),
        resolve_age.as_ref(),
        prefix.as_ref(),
    ))
}
