//! Data models for Lookout.
//!
//! Defines the typed vocabulary used across the database, permission and
//! form layers: access levels, permission answers, project status and the
//! option schema.

mod access;
mod options;
mod project;

pub use access::*;
pub use options::*;
pub use project::*;

use chrono::{DateTime, Utc};

/// Current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}
