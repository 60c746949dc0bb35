//! Configuration management for Lookout.
//!
//! Loads configuration from environment variables (with `.env` support):
//! - Server bind address and database location
//! - Mail defaults used when a project has no override
//! - Project policy switches consumed by the permission layer

use std::env;
use std::sync::OnceLock;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Get the global configuration
pub fn config() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

/// Initialize configuration (call once at startup)
pub fn init() -> &'static Config {
    config()
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub mail: MailConfig,
    pub projects: ProjectPolicyConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Where unauthenticated requests are sent.
    pub login_url: String,
    /// Mark cookies we issue (flash, csrf) as `Secure`.
    pub secure_cookies: bool,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    /// Subject prefix used when a project has not set `mail:subject_prefix`.
    pub subject_prefix: String,
}

#[derive(Debug, Clone)]
pub struct ProjectPolicyConfig {
    /// Whether non-superusers may mark projects public.
    pub allow_public_projects: bool,
    /// Slug of the project Lookout reports its own errors into. It can never be removed.
    pub internal_project_slug: Option<String>,
    /// Project slugs whose settings are frozen.
    pub locked_projects: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 9000,
            },
            database: DatabaseConfig {
                path: "./data/lookout.db".to_string(),
            },
            session: SessionConfig {
                login_url: "/login".to_string(),
                secure_cookies: false,
            },
            mail: MailConfig {
                subject_prefix: "[Lookout] ".to_string(),
            },
            projects: ProjectPolicyConfig {
                allow_public_projects: true,
                internal_project_slug: None,
                locked_projects: Vec::new(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Self {
            server: ServerConfig {
                host: env_or("HOST", &defaults.server.host),
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            database: DatabaseConfig {
                path: env_or("DATABASE_PATH", &defaults.database.path),
            },
            session: SessionConfig {
                login_url: env_or("LOGIN_URL", &defaults.session.login_url),
                secure_cookies: env_flag("SECURE_COOKIES", defaults.session.secure_cookies),
            },
            mail: MailConfig {
                subject_prefix: env_or("MAIL_SUBJECT_PREFIX", &defaults.mail.subject_prefix),
            },
            projects: ProjectPolicyConfig {
                allow_public_projects: env_flag(
                    "ALLOW_PUBLIC_PROJECTS",
                    defaults.projects.allow_public_projects,
                ),
                internal_project_slug: env::var("INTERNAL_PROJECT_SLUG")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                locked_projects: env::var("LOCKED_PROJECTS")
                    .map(|v| parse_list(&v))
                    .unwrap_or_default(),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no" | "off"))
        .unwrap_or(default)
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_skips_blanks() {
        assert_eq!(
            parse_list(" internal, ,billing ,"),
            vec!["internal".to_string(), "billing".to_string()]
        );
        assert!(parse_list("").is_empty());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.mail.subject_prefix, "[Lookout] ");
        assert!(config.projects.allow_public_projects);
        assert!(config.projects.locked_projects.is_empty());
    }
}
