//! Audit configuration used by integration tests

use serde_json::json;

use version_audit::config::{AuditConfig, ConfigFile};

pub const LIBRARY_REPO: &str = "platform/core";
pub const LIBRARY_VERSION_FILE: &str = "version.properties";
/// File in which projects declare both their own and the library version
pub const PROJECT_FILE: &str = "gradle.properties";

/// Library declares `version=X`; projects declare `version=X` and `coreVersion=Y`
pub fn test_config(projects: &[(&str, &str)]) -> AuditConfig {
    let repositories: Vec<_> = projects
        .iter()
        .map(|(name, repository)| json!({ "name": name, "repository": repository }))
        .collect();

    let file: ConfigFile = serde_json::from_value(json!({
        "gitlab": { "url": "https://gitlab.example.com" },
        "library": {
            "name": "Core",
            "repository": LIBRARY_REPO,
            "versionFilePath": LIBRARY_VERSION_FILE,
            "versionRegex": "version=(\\S+)",
            "artifactUrl": "https://nexus.example.com/core/",
            "artifactRegex": "(\\d[\\w.-]*)/"
        },
        "projects": {
            "repositories": repositories,
            "projectVersionPaths": [PROJECT_FILE],
            "projectVersionRegex": ["(?m)^version=(\\S+)"],
            "libraryVersionPath": [PROJECT_FILE],
            "libraryVersionRegex": ["(?m)^coreVersion=(\\S+)"]
        }
    }))
    .unwrap();

    AuditConfig::resolve(file, |_| None).unwrap()
}

/// Content of a project's properties file
pub fn project_file(version: &str, core_version: Option<&str>) -> String {
    match core_version {
        Some(core) => format!("version={version}\ncoreVersion={core}\n"),
        None => format!("version={version}\n"),
    }
}
