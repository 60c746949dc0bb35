//! Typed view over the per-project option store.
//!
//! The store itself is an open `key -> JSON` map shared with other parts of
//! the system. Only the keys listed in [`OptionKey`] are interpreted here;
//! everything else is left alone.

use serde_json::Value;

/// Option keys owned by the project settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    /// Allowed origins for cross-origin event submission.
    Origins,
    /// Minutes without new events before an issue is auto-resolved.
    ResolveAge,
    /// Prefix for notification email subjects.
    MailSubjectPrefix,
}

impl OptionKey {
    /// Key as stored in `project_options.key`.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::Origins => "core:origins",
            Self::ResolveAge => "core:resolve_age",
            Self::MailSubjectPrefix => "mail:subject_prefix",
        }
    }
}

/// Decoded values of the settings-page options. `None` means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectOptions {
    pub origins: Option<Vec<String>>,
    pub resolve_age: Option<u32>,
    pub mail_subject_prefix: Option<String>,
}

impl ProjectOptions {
    /// Decode from stored values, ignoring values of an unexpected shape.
    pub fn from_values(
        origins: Option<&Value>,
        resolve_age: Option<&Value>,
        mail_subject_prefix: Option<&Value>,
    ) -> Self {
        Self {
            origins: origins.and_then(decode_origins),
            resolve_age: resolve_age.and_then(decode_resolve_age),
            mail_subject_prefix: mail_subject_prefix.and_then(decode_string),
        }
    }

    /// Origins, or an empty list when unset.
    pub fn origins_or_empty(&self) -> &[String] {
        self.origins.as_deref().unwrap_or(&[])
    }

    /// Resolve age, or 0 (never auto-resolve) when unset.
    pub fn resolve_age_or_default(&self) -> u32 {
        self.resolve_age.unwrap_or(0)
    }

    /// Subject prefix, falling back to the configured default.
    pub fn mail_subject_prefix_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.mail_subject_prefix.as_deref().unwrap_or(default)
    }
}

fn decode_origins(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Null => None,
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect(),
        ),
        // Older rows stored the raw textarea contents.
        Value::String(s) => Some(
            s.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

fn decode_resolve_age(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn decode_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}
