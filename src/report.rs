//! Audit report: structured result of a run and its text rendering

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::audit::catalog::Catalog;
use crate::audit::finding::{Finding, Findings};
use crate::audit::project::Project;

#[derive(Debug, Clone, Serialize)]
pub struct LibrarySummary {
    pub name: String,
    pub repository: String,
}

/// Everything an audit run produced
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub library: LibrarySummary,
    pub catalog: Catalog,
    pub projects: Vec<Project>,
    pub findings: Findings,
}

impl AuditReport {
    pub fn new(
        library: LibrarySummary,
        catalog: Catalog,
        projects: Vec<Project>,
        findings: Findings,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            library,
            catalog,
            projects,
            findings,
        }
    }

    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text rendering: findings, library versions, project versions
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let library = &self.library.name;

        let _ = writeln!(
            out,
            "Version audit of {} ({}) at {}",
            library,
            self.library.repository,
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        let _ = writeln!(out, "\nFindings ({}):", self.findings.len());
        if self.findings.is_empty() {
            let _ = writeln!(out, "  none");
        }
        for finding in self.findings.iter() {
            let _ = writeln!(out, "  {}", finding);
        }

        let _ = writeln!(out, "\n{} versions:", library);
        for version in self.catalog.sorted_desc() {
            let _ = writeln!(
                out,
                "  {} [{}, from {}]",
                version.name, version.category, version.source_revision
            );
            if !version.is_in_use() {
                let _ = writeln!(out, "    not in use");
            }
            for user in &version.used_by {
                let _ = writeln!(out, "    {} @ {}", user.repository, user.revision);
            }
        }

        let _ = writeln!(out, "\nProjects:");
        for project in &self.projects {
            let (version, dependency) = match project.latest_version() {
                Some(latest) => (
                    latest.name.as_str(),
                    latest
                        .declared_library_version
                        .clone()
                        .unwrap_or_else(|| format!("not using {}", library)),
                ),
                None => ("unknown", format!("not using {}", library)),
            };
            let _ = writeln!(out, "  {}: {} -> {}", project.name, version, dependency);
        }

        out
    }
}
