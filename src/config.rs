use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::audit::extract::ExtractionRule;

// =============================================================================
// Defaults
// =============================================================================

/// Timeout for a single fetch from source control or the artifact repository (30 seconds)
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;

/// Number of project repositories processed at the same time
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Page size used when listing branches and tags
pub const GITLAB_PAGE_SIZE: u32 = 100;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing required configuration: {0}")]
    MissingField(&'static str),

    #[error("{which}: {paths} paths but {patterns} patterns")]
    MismatchedRules {
        which: &'static str,
        paths: usize,
        patterns: usize,
    },

    #[error("Invalid pattern '{pattern}' for {field}: {reason}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        reason: String,
    },

    #[error("Environment variable {0} holding the GitLab token is not set")]
    MissingToken(String),
}

// =============================================================================
// File format
// =============================================================================

/// Configuration file structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigFile {
    pub gitlab: GitLabSection,
    pub library: LibrarySection,
    pub projects: ProjectsSection,
    pub audit: AuditSection,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitLabSection {
    pub url: String,
    /// Name of the environment variable holding a private token
    pub token_env: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LibrarySection {
    pub name: String,
    pub repository: String,
    pub version_file_path: String,
    pub version_regex: String,
    pub artifact_url: String,
    pub artifact_regex: String,
}

/// Tracked repositories plus the extraction rules they share
///
/// Paths and patterns are parallel lists paired by index.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectsSection {
    pub repositories: Vec<RepositoryEntry>,
    pub project_version_paths: Vec<String>,
    pub project_version_regex: Vec<String>,
    pub library_version_path: Vec<String>,
    pub library_version_regex: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryEntry {
    /// Display name, defaults to the last segment of the repository path
    #[serde(default)]
    pub name: Option<String>,
    pub repository: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditSection {
    /// Record a finding when a revision's own version cannot be read
    pub report_undetermined_versions: bool,
    pub concurrency: usize,
    pub fetch_timeout_ms: u64,
}

impl Default for AuditSection {
    fn default() -> Self {
        Self {
            report_undetermined_versions: false,
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

// =============================================================================
// Resolved configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub gitlab: GitLabConfig,
    pub library: LibraryConfig,
    pub projects: Vec<ProjectConfig>,
    pub rules: ProjectRules,
    pub options: AuditOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GitLabConfig {
    pub url: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LibraryConfig {
    pub name: String,
    pub repository: String,
    pub version_rule: ExtractionRule,
    pub artifact_url: String,
    pub artifact_pattern: Regex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
    pub name: String,
    pub repository: String,
}

/// Extraction rules shared by every project, tried in order
#[derive(Debug, Clone, Default)]
pub struct ProjectRules {
    pub project_version: Vec<ExtractionRule>,
    pub library_version: Vec<ExtractionRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditOptions {
    pub report_undetermined_versions: bool,
    pub concurrency: usize,
    pub fetch_timeout: Duration,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            report_undetermined_versions: false,
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }
}

impl AuditConfig {
    /// Reads and validates a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = serde_json::from_str(&content)?;
        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Validates a parsed config file, looking up secrets through `env`
    pub fn resolve<F>(file: ConfigFile, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gitlab = resolve_gitlab(file.gitlab, env)?;
        let library = resolve_library(file.library)?;
        let rules = ProjectRules {
            project_version: zip_rules(
                "projectVersionPaths/projectVersionRegex",
                file.projects.project_version_paths,
                file.projects.project_version_regex,
            )?,
            library_version: zip_rules(
                "libraryVersionPath/libraryVersionRegex",
                file.projects.library_version_path,
                file.projects.library_version_regex,
            )?,
        };
        let projects = file
            .projects
            .repositories
            .into_iter()
            .map(resolve_project)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            gitlab,
            library,
            projects,
            rules,
            options: AuditOptions {
                report_undetermined_versions: file.audit.report_undetermined_versions,
                concurrency: file.audit.concurrency.max(1),
                fetch_timeout: Duration::from_millis(file.audit.fetch_timeout_ms),
            },
        })
    }
}

fn require(value: String, field: &'static str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::MissingField(field));
    }
    Ok(value.to_string())
}

fn compile(field: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        field,
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Compiles a version pattern, which must capture the version in group 1
fn compile_version_pattern(field: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    let regex = compile(field, pattern)?;
    if regex.captures_len() < 2 {
        return Err(ConfigError::InvalidPattern {
            field,
            pattern: pattern.to_string(),
            reason: "pattern has no capture group".to_string(),
        });
    }
    Ok(regex)
}

fn resolve_gitlab<F>(section: GitLabSection, env: F) -> Result<GitLabConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let url = require(section.url, "gitlab.url")?;
    let token = match section.token_env {
        Some(var) => {
            let token = env(&var)
                .filter(|token| !token.trim().is_empty())
                .ok_or(ConfigError::MissingToken(var))?;
            Some(token)
        }
        None => None,
    };
    Ok(GitLabConfig {
        url: url.trim_end_matches('/').to_string(),
        token,
    })
}

fn resolve_library(section: LibrarySection) -> Result<LibraryConfig, ConfigError> {
    let name = require(section.name, "library.name")?;
    let repository = require(section.repository, "library.repository")?;
    let version_file_path = require(section.version_file_path, "library.versionFilePath")?;
    let version_regex = require(section.version_regex, "library.versionRegex")?;
    let artifact_url = require(section.artifact_url, "library.artifactUrl")?;
    let artifact_regex = require(section.artifact_regex, "library.artifactRegex")?;

    Ok(LibraryConfig {
        name,
        repository,
        version_rule: ExtractionRule::new(
            version_file_path,
            compile_version_pattern("library.versionRegex", &version_regex)?,
        ),
        artifact_url,
        artifact_pattern: compile("library.artifactRegex", &artifact_regex)?,
    })
}

fn resolve_project(entry: RepositoryEntry) -> Result<ProjectConfig, ConfigError> {
    let repository = require(entry.repository, "projects.repositories[].repository")?;
    let name = entry
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| {
            repository
                .rsplit('/')
                .next()
                .unwrap_or(&repository)
                .to_string()
        });
    Ok(ProjectConfig { name, repository })
}

fn non_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn zip_rules(
    which: &'static str,
    paths: Vec<String>,
    patterns: Vec<String>,
) -> Result<Vec<ExtractionRule>, ConfigError> {
    let paths = non_blank(paths);
    let patterns = non_blank(patterns);
    if paths.len() != patterns.len() {
        return Err(ConfigError::MismatchedRules {
            which,
            paths: paths.len(),
            patterns: patterns.len(),
        });
    }

    paths
        .into_iter()
        .zip(patterns)
        .map(|(path, pattern)| {
            Ok(ExtractionRule::new(
                path,
                compile_version_pattern(which, &pattern)?,
            ))
        })
        .collect()
}

/// Returns the default config file location.
/// Uses $XDG_CONFIG_HOME/version-audit/config.json if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/version-audit/config.json,
/// or ./version-audit/config.json if neither is available.
pub fn default_config_path() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
        .join("config.json")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("version-audit")
}
