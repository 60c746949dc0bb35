//! The project settings form.
//!
//! `EditProjectForm` carries the displayed field values, per-field errors and
//! the choice lists for the template. It is built either from stored state
//! (`initial`) or from a submission (`bind`); `clean` validates a bound form
//! and yields the values to persist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::db::{self, DbPool, Project, ProjectChanges, Team};
use crate::models::{self, OptionKey, ProjectOptions, PLATFORMS};
use crate::Result;

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_SLUG_LENGTH: usize = 50;
pub const MAX_SUBJECT_PREFIX_LENGTH: usize = 200;
/// One week, in minutes.
pub const MAX_RESOLVE_AGE: u32 = 10_080;

/// Raw form submission. Absent fields read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EditProjectInput {
    pub name: String,
    pub slug: String,
    pub platform: String,
    /// Checkbox: present (any value) when ticked.
    pub public: Option<String>,
    pub team: String,
    pub owner: String,
    pub origins: String,
    pub resolve_age: String,
    pub mail_subject_prefix: String,
    pub csrf_token: Option<String>,
}

/// Field values as shown in the form.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FormValues {
    pub name: String,
    pub slug: String,
    pub platform: String,
    pub public: bool,
    pub team: String,
    pub owner: String,
    pub origins: String,
    pub resolve_age: String,
    pub mail_subject_prefix: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

/// Values that passed validation, ready to be written.
#[derive(Debug, Clone)]
pub struct CleanedProjectSettings {
    pub changes: ProjectChanges,
    pub origins: Vec<String>,
    pub resolve_age: u32,
    pub mail_subject_prefix: String,
}

impl CleanedProjectSettings {
    /// Save the project record, then overwrite the three settings options.
    ///
    /// The writes are independent statements. Other option keys are not touched.
    pub async fn save(&self, pool: &DbPool, project_id: &str) -> Result<Project> {
        let project = db::update_project(pool, project_id, &self.changes).await?;

        db::update_option(
            pool,
            project_id,
            OptionKey::Origins.storage_key(),
            &serde_json::json!(self.origins),
        )
        .await?;
        db::update_option(
            pool,
            project_id,
            OptionKey::ResolveAge.storage_key(),
            &serde_json::json!(self.resolve_age),
        )
        .await?;
        db::update_option(
            pool,
            project_id,
            OptionKey::MailSubjectPrefix.storage_key(),
            &serde_json::json!(self.mail_subject_prefix),
        )
        .await?;

        Ok(project)
    }
}

/// The settings form as handed to the template.
#[derive(Debug, Clone, Serialize)]
pub struct EditProjectForm {
    pub values: FormValues,
    pub errors: BTreeMap<&'static str, Vec<String>>,
    /// `None` when the team field is not offered.
    pub team_choices: Option<Vec<Choice>>,
    pub show_public: bool,
    pub platforms: Vec<Choice>,
}

impl EditProjectForm {
    /// A form pre-filled from the project and its stored options.
    pub fn initial(
        project: &Project,
        team: &Team,
        team_list: &[Team],
        owner_username: Option<&str>,
        options: &ProjectOptions,
        default_subject_prefix: &str,
        show_public: bool,
    ) -> Self {
        let values = FormValues {
            name: project.name.clone(),
            slug: project.slug.clone(),
            platform: project.platform.clone().unwrap_or_default(),
            public: project.public,
            team: project.team_id.clone(),
            owner: owner_username.unwrap_or_default().to_string(),
            origins: options.origins_or_empty().join("\n"),
            resolve_age: options.resolve_age_or_default().to_string(),
            mail_subject_prefix: options
                .mail_subject_prefix_or(default_subject_prefix)
                .to_string(),
        };

        Self::with_values(values, team, team_list, show_public)
    }

    /// A form holding a submission, not yet validated.
    pub fn bind(input: EditProjectInput, team: &Team, team_list: &[Team], show_public: bool) -> Self {
        let values = FormValues {
            name: input.name,
            slug: input.slug,
            platform: input.platform,
            public: input.public.is_some(),
            team: input.team,
            owner: input.owner,
            origins: input.origins,
            resolve_age: input.resolve_age,
            mail_subject_prefix: input.mail_subject_prefix,
        };

        Self::with_values(values, team, team_list, show_public)
    }

    fn with_values(values: FormValues, team: &Team, team_list: &[Team], show_public: bool) -> Self {
        Self {
            values,
            errors: BTreeMap::new(),
            team_choices: team_choices(team, team_list),
            show_public,
            platforms: PLATFORMS
                .iter()
                .map(|(value, label)| Choice {
                    value: value.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn add_error(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    /// Record an error that belongs to the submission as a whole.
    pub fn add_form_error(&mut self, message: impl Into<String>) {
        self.add_error("form", message);
    }

    /// Validate a bound form against `project`.
    ///
    /// Field problems are recorded on the form and yield `Ok(None)`; only
    /// database failures are returned as errors.
    pub async fn clean(
        &mut self,
        pool: &DbPool,
        project: &Project,
    ) -> Result<Option<CleanedProjectSettings>> {
        let name = self.values.name.trim().to_string();
        if name.is_empty() {
            self.add_error("name", "This field is required.");
        } else if name.chars().count() > MAX_NAME_LENGTH {
            self.add_error(
                "name",
                format!("Ensure this value has at most {} characters.", MAX_NAME_LENGTH),
            );
        }

        let platform = self.values.platform.trim().to_string();
        let platform = if platform.is_empty() {
            None
        } else if models::is_known_platform(&platform) {
            Some(platform)
        } else {
            self.add_error("platform", "Select a valid choice.");
            None
        };

        let public = if self.show_public {
            self.values.public
        } else {
            project.public
        };

        let team_id = self.clean_team(project);
        let owner_id = self.clean_owner(pool).await?;

        let slug = self.values.slug.trim().to_string();
        let slug = if slug.is_empty() {
            project.slug.clone()
        } else {
            if let Err(message) = validate_slug(&slug) {
                self.add_error("slug", message);
            } else if db::project_slug_taken(pool, &team_id, &slug, &project.id).await? {
                self.add_error("slug", "Another project is already using that slug.");
            }
            slug
        };

        let origins = match parse_origins(&self.values.origins) {
            Ok(origins) => origins,
            Err(message) => {
                self.add_error("origins", message);
                Vec::new()
            }
        };

        let resolve_age = match parse_resolve_age(&self.values.resolve_age) {
            Ok(age) => age,
            Err(message) => {
                self.add_error("resolve_age", message);
                0
            }
        };

        let mail_subject_prefix = self.values.mail_subject_prefix.clone();
        if mail_subject_prefix.chars().count() > MAX_SUBJECT_PREFIX_LENGTH {
            self.add_error(
                "mail_subject_prefix",
                format!(
                    "Ensure this value has at most {} characters.",
                    MAX_SUBJECT_PREFIX_LENGTH
                ),
            );
        }

        if !self.is_valid() {
            return Ok(None);
        }

        Ok(Some(CleanedProjectSettings {
            changes: ProjectChanges {
                team_id,
                slug,
                name,
                platform,
                public,
                owner_id,
            },
            origins,
            resolve_age,
            mail_subject_prefix,
        }))
    }

    /// Destination team: the current one unless another offered team was chosen.
    fn clean_team(&mut self, project: &Project) -> String {
        let chosen = self.values.team.trim().to_string();

        let offered = match &self.team_choices {
            None => return project.team_id.clone(),
            Some(choices) => choices.iter().any(|c| c.value == chosen),
        };

        if chosen.is_empty() || chosen == project.team_id {
            return project.team_id.clone();
        }

        if offered {
            chosen
        } else {
            self.add_error("team", "Unable to find chosen team.");
            project.team_id.clone()
        }
    }

    async fn clean_owner(&mut self, pool: &DbPool) -> Result<Option<String>> {
        let username = self.values.owner.trim().to_string();
        if username.is_empty() {
            return Ok(None);
        }

        match db::get_user_by_username(pool, &username).await? {
            Some(user) => Ok(Some(user.id)),
            None => {
                self.add_error("owner", "Invalid username.");
                Ok(None)
            }
        }
    }
}

/// Team choices for the form, or `None` when the project's own team would
/// be the only choice.
fn team_choices(team: &Team, team_list: &[Team]) -> Option<Vec<Choice>> {
    if team_list.iter().all(|t| t.id == team.id) {
        return None;
    }

    let mut teams: Vec<&Team> = team_list.iter().collect();
    teams.sort_by(|a, b| a.name.cmp(&b.name));
    if !teams.iter().any(|t| t.id == team.id) {
        teams.insert(0, team);
    }

    Some(
        teams
            .into_iter()
            .map(|t| Choice {
                value: t.id.clone(),
                label: t.name.clone(),
            })
            .collect(),
    )
}

fn validate_slug(slug: &str) -> std::result::Result<(), String> {
    if slug.len() > MAX_SLUG_LENGTH {
        return Err(format!(
            "Ensure this value has at most {} characters.",
            MAX_SLUG_LENGTH
        ));
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(
            "Enter a valid slug consisting of lowercase letters, numbers, underscores or hyphens."
                .to_string(),
        );
    }
    Ok(())
}

/// Split the origins textarea into a list, validating every entry.
///
/// Lines are trimmed and blank lines dropped, so empty input yields an
/// empty list.
pub fn parse_origins(text: &str) -> std::result::Result<Vec<String>, String> {
    let origins: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    for origin in &origins {
        if !is_valid_origin(origin) {
            return Err(format!("'{}' is not an acceptable value.", origin));
        }
    }

    Ok(origins)
}

/// `*`, `localhost`, or an http(s) URL with a host. A `*.` wildcard may
/// lead the host.
pub fn is_valid_origin(value: &str) -> bool {
    if value == "*" || value == "localhost" {
        return true;
    }

    let value = value.to_lowercase();
    let Some((scheme, rest)) = value.split_once("://") else {
        return false;
    };
    if scheme != "http" && scheme != "https" {
        return false;
    }

    let rest = rest.strip_prefix("*.").unwrap_or(rest);
    if rest.contains('*') {
        return false;
    }

    Url::parse(&format!("{}://{}", scheme, rest))
        .map(|url| url.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}

fn parse_resolve_age(text: &str) -> std::result::Result<u32, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }

    let age: i64 = text
        .parse()
        .map_err(|_| "Enter a whole number.".to_string())?;

    if age < 0 {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    if age > i64::from(MAX_RESOLVE_AGE) {
        return Err(format!(
            "Ensure this value is less than or equal to {}.",
            MAX_RESOLVE_AGE
        ));
    }

    Ok(age as u32)
}
