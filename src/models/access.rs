//! Team access levels and permission hook vocabulary.

use serde::{Deserialize, Serialize};

/// Access a user holds on a team.
///
/// Stored as an integer where a lower number means more privilege:
/// owner (0) > user (50) > system (100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamAccess {
    Owner,
    User,
    System,
}

impl TeamAccess {
    pub fn level(&self) -> i64 {
        match self {
            Self::Owner => 0,
            Self::User => 50,
            Self::System => 100,
        }
    }

    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(Self::Owner),
            50 => Some(Self::User),
            100 => Some(Self::System),
            _ => None,
        }
    }

    /// Check if this access level grants at least `required`.
    pub fn is_at_least(&self, required: TeamAccess) -> bool {
        self.level() <= required.level()
    }
}

/// Actions a permission plugin can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    EditProject,
    RemoveProject,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EditProject => "edit_project",
            Self::RemoveProject => "remove_project",
        }
    }
}

/// Answer from a permission plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionResult {
    Allow,
    Deny,
    /// The plugin has no opinion; the next one is consulted.
    #[default]
    Abstain,
}
