//! Tracked project repositories and per-revision version processing

use serde::Serialize;
use tracing::{debug, info};

use crate::audit::artifacts::is_snapshot;
use crate::audit::catalog::{Catalog, UsedBy};
use crate::audit::extract::Extractor;
use crate::audit::finding::{Finding, FindingKind, Findings, SubjectKind};
use crate::audit::library::stale_branch;
use crate::audit::precedence::latest;
use crate::audit::revision::{Revision, RevisionCategory, is_in_working_set, is_release_candidate};
use crate::config::{ProjectConfig, ProjectRules};

/// The version a project declares at one revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectVersion {
    pub name: String,
    pub category: RevisionCategory,
    pub source_revision: String,
    /// Library version this revision depends on, if it declares one
    pub declared_library_version: Option<String>,
}

/// A tracked repository and the versions found on its revisions
///
/// Identity is the repository path.
#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub name: String,
    pub repository: String,
    /// In processing order
    pub versions: Vec<ProjectVersion>,
}

impl Project {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            name: config.name.clone(),
            repository: config.repository.clone(),
            versions: Vec::new(),
        }
    }

    /// The project version with the highest precedence
    pub fn latest_version(&self) -> Option<&ProjectVersion> {
        latest(&self.versions, |v| v.name.as_str())
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.repository == other.repository
    }
}

impl Eq for Project {}

impl std::hash::Hash for Project {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.repository.hash(state);
    }
}

/// Result of processing one repository
///
/// Usages are collected here instead of being written to the catalog, so
/// repositories can be processed concurrently and merged in a fixed order.
#[derive(Debug)]
pub struct ProjectOutcome {
    pub project: Project,
    /// (library version, user) pairs in processing order
    pub usages: Vec<(String, UsedBy)>,
    pub findings: Findings,
}

pub struct ProjectProcessor<'a> {
    extractor: &'a Extractor<'a>,
    catalog: &'a Catalog,
    rules: &'a ProjectRules,
    library_name: &'a str,
    report_undetermined_versions: bool,
}

impl<'a> ProjectProcessor<'a> {
    pub fn new(
        extractor: &'a Extractor<'a>,
        catalog: &'a Catalog,
        rules: &'a ProjectRules,
        library_name: &'a str,
    ) -> Self {
        Self {
            extractor,
            catalog,
            rules,
            library_name,
            report_undetermined_versions: false,
        }
    }

    /// Record a finding for revisions whose own version cannot be read
    pub fn report_undetermined_versions(mut self, enabled: bool) -> Self {
        self.report_undetermined_versions = enabled;
        self
    }

    pub async fn process(&self, config: &ProjectConfig) -> ProjectOutcome {
        let mut outcome = ProjectOutcome {
            project: Project::new(config),
            usages: Vec::new(),
            findings: Findings::new(),
        };
        let repository = config.repository.as_str();
        let source = self.extractor.source();

        let listing = tokio::try_join!(
            source.list_branches(repository),
            source.list_tags(repository)
        );
        let (branches, tags) = match listing {
            Ok(listing) => listing,
            Err(e) => {
                outcome.findings.push(Finding::new(
                    FindingKind::RepositoryUnavailable,
                    SubjectKind::Repository,
                    repository,
                    format!("project '{}' could not be listed, skipping: {}", config.name, e),
                ));
                return outcome;
            }
        };

        for branch in branches.iter().filter(|b| b.merged) {
            outcome
                .findings
                .push(stale_branch(&config.name, repository, branch));
        }

        let release_candidates: Vec<&str> = branches
            .iter()
            .map(|b| b.name.as_str())
            .filter(|name| is_release_candidate(name))
            .collect();
        if release_candidates.len() > 1 {
            outcome.findings.push(Finding::new(
                FindingKind::MultipleReleaseBranches,
                SubjectKind::Repository,
                repository,
                format!(
                    "project '{}' has more than one ready to release branch: {:?}",
                    config.name, release_candidates
                ),
            ));
        }

        let working_set: Vec<Revision> = branches
            .into_iter()
            .filter(|b| is_in_working_set(&b.name))
            .map(Revision::from)
            .chain(tags.into_iter().map(Revision::from))
            .collect();

        info!(
            "{}: processing {} revisions",
            config.name,
            working_set.len()
        );

        for revision in &working_set {
            self.process_revision(repository, revision, &mut outcome)
                .await;
        }

        outcome
    }

    async fn process_revision(
        &self,
        repository: &str,
        revision: &Revision,
        outcome: &mut ProjectOutcome,
    ) {
        let name = revision.name();
        let (project_version, library_version) = tokio::join!(
            self.extractor
                .first_match(repository, name, &self.rules.project_version),
            self.extractor
                .first_match(repository, name, &self.rules.library_version)
        );
        let subject = format!("{}@{}", repository, name);

        if let Some(declared) = library_version.as_deref() {
            if self.catalog.contains(declared) {
                outcome
                    .usages
                    .push((declared.to_string(), UsedBy::new(repository, name)));
            } else {
                outcome.findings.push(Finding::new(
                    FindingKind::UnknownLibraryVersion,
                    SubjectKind::ProjectRevision,
                    &subject,
                    format!(
                        "repo '{}' revision '{}' uses unknown version of {}: '{}'",
                        repository, name, self.library_name, declared
                    ),
                ));
            }

            if is_snapshot(declared) && revision.is_release_track() {
                outcome.findings.push(Finding::new(
                    FindingKind::SnapshotDependency,
                    SubjectKind::ProjectRevision,
                    &subject,
                    format!(
                        "repo '{}' revision '{}' uses {} pre-release version '{}' on a release-track revision",
                        repository, name, self.library_name, declared
                    ),
                ));
            }
        }

        match project_version {
            Some(version) => {
                debug!("{}: version '{}'", subject, version);
                outcome.project.versions.push(ProjectVersion {
                    name: version,
                    category: revision.category(),
                    source_revision: name.to_string(),
                    declared_library_version: library_version,
                });
            }
            None if self.report_undetermined_versions => {
                outcome.findings.push(Finding::new(
                    FindingKind::VersionUndetermined,
                    SubjectKind::ProjectRevision,
                    &subject,
                    format!("repo '{}' revision '{}' unable to get version", repository, name),
                ));
            }
            None => debug!("{}: no version found", subject),
        }
    }
}
