//! Audit findings
//!
//! A finding is one detected inconsistency. Findings never stop a run; they
//! are appended in the order they are detected and handed to the report.

use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// What a finding is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    LibraryVersion,
    ProjectRevision,
    Repository,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    /// Branch already merged, can be deleted
    StaleBranch,
    /// Artifact published without a matching tag
    PublishedNotTagged,
    /// Pre-release artifacts on the release channel
    SnapshotPublished,
    /// Published version declared on a branch instead of a tag
    MustBeTagged,
    TaggedNotPublished,
    UnknownLibraryVersion,
    /// Release-track revision depends on a pre-release library build
    SnapshotDependency,
    MultipleReleaseBranches,
    RepositoryUnavailable,
    ArtifactListingUnavailable,
    VersionUndetermined,
}

impl FindingKind {
    /// Stable identifier used in reports
    pub fn code(&self) -> &'static str {
        match self {
            FindingKind::StaleBranch => "stale_branch",
            FindingKind::PublishedNotTagged => "published_not_tagged",
            FindingKind::SnapshotPublished => "snapshot_published",
            FindingKind::MustBeTagged => "must_be_tagged",
            FindingKind::TaggedNotPublished => "tagged_not_published",
            FindingKind::UnknownLibraryVersion => "unknown_library_version",
            FindingKind::SnapshotDependency => "snapshot_dependency",
            FindingKind::MultipleReleaseBranches => "multiple_release_branches",
            FindingKind::RepositoryUnavailable => "repository_unavailable",
            FindingKind::ArtifactListingUnavailable => "artifact_listing_unavailable",
            FindingKind::VersionUndetermined => "version_undetermined",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FindingKind::StaleBranch | FindingKind::VersionUndetermined => Severity::Info,
            FindingKind::PublishedNotTagged
            | FindingKind::SnapshotPublished
            | FindingKind::MustBeTagged
            | FindingKind::TaggedNotPublished
            | FindingKind::UnknownLibraryVersion
            | FindingKind::SnapshotDependency
            | FindingKind::MultipleReleaseBranches
            | FindingKind::RepositoryUnavailable
            | FindingKind::ArtifactListingUnavailable => Severity::Warning,
        }
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub severity: Severity,
    pub subject_kind: SubjectKind,
    pub subject_id: String,
    pub message: String,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        subject_kind: SubjectKind,
        subject_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            subject_kind,
            subject_id: subject_id.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Append-only list of findings, logged as they are recorded
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct Findings {
    items: Vec<Finding>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Info => info!("{}", finding),
            Severity::Warning => warn!("{}", finding),
        }
        self.items.push(finding);
    }

    pub fn extend(&mut self, other: Findings) {
        self.items.extend(other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.items.iter()
    }

    /// Findings of one kind, in recording order
    pub fn of_kind(&self, kind: FindingKind) -> impl Iterator<Item = &Finding> {
        self.items.iter().filter(move |f| f.kind == kind)
    }
}
