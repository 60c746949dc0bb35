//! Project vocabulary shared by the database layer and the settings form.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Visible,
    Hidden,
    PendingDeletion,
    DeletionInProgress,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::PendingDeletion => "pending_deletion",
            Self::DeletionInProgress => "deletion_in_progress",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "hidden" => Self::Hidden,
            "pending_deletion" => Self::PendingDeletion,
            "deletion_in_progress" => Self::DeletionInProgress,
            _ => Self::Visible,
        }
    }

    /// Whether the project is on its way out.
    pub fn is_being_deleted(&self) -> bool {
        matches!(self, Self::PendingDeletion | Self::DeletionInProgress)
    }
}

/// Platform identifiers offered by the settings form, with display labels.
pub const PLATFORMS: &[(&str, &str)] = &[
    ("csharp", "C#"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("go", "Go"),
    ("java", "Java"),
    ("javascript", "JavaScript"),
    ("node.js", "Node.js"),
    ("php", "PHP"),
    ("python", "Python"),
    ("rails", "Rails"),
    ("ruby", "Ruby"),
    ("rust", "Rust"),
    ("other", "Other"),
];

/// Check a platform identifier against [`PLATFORMS`].
pub fn is_known_platform(platform: &str) -> bool {
    PLATFORMS.iter().any(|(id, _)| *id == platform)
}
