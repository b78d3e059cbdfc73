//! Revision naming conventions and lifecycle classification

use serde::Serialize;

/// Branch name prefixes that mark a revision as ready for release
const RELEASE_TRACK_PREFIXES: &[&str] = &["hotfix", "release", "master"];

/// Branch name prefixes whose versions are extracted during project processing
const WORKING_SET_PREFIXES: &[&str] = &["hotfix", "release", "develop", "master"];

/// Branch name prefixes that count towards concurrent release preparation
const RELEASE_CANDIDATE_PREFIXES: &[&str] = &["hotfix", "release"];

/// Lifecycle state of a revision, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionCategory {
    Master,
    Develop,
    Feature,
    Release,
    Hotfix,
    Support,
    /// Assigned to tags only, never derived from a branch name
    Released,
    Unknown,
}

impl RevisionCategory {
    /// Returns the string representation of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionCategory::Master => "master",
            RevisionCategory::Develop => "develop",
            RevisionCategory::Feature => "feature",
            RevisionCategory::Release => "release",
            RevisionCategory::Hotfix => "hotfix",
            RevisionCategory::Support => "support",
            RevisionCategory::Released => "released",
            RevisionCategory::Unknown => "unknown",
        }
    }

    /// Classify a branch by its name
    pub fn from_branch_name(name: &str) -> Self {
        if name == "develop" {
            RevisionCategory::Develop
        } else if name == "master" {
            RevisionCategory::Master
        } else if name.starts_with("feature/") {
            RevisionCategory::Feature
        } else if name.starts_with("release/") {
            RevisionCategory::Release
        } else if name.starts_with("hotfix/") {
            RevisionCategory::Hotfix
        } else if name.starts_with("support/") {
            RevisionCategory::Support
        } else {
            RevisionCategory::Unknown
        }
    }
}

impl std::fmt::Display for RevisionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a revision. Tags are always `Released`, whatever their name.
pub fn classify(name: &str, is_tag: bool) -> RevisionCategory {
    if is_tag {
        RevisionCategory::Released
    } else {
        RevisionCategory::from_branch_name(name)
    }
}

/// A branch as reported by source control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    /// Already merged into the default branch
    pub merged: bool,
}

impl Branch {
    pub fn new(name: impl Into<String>, merged: bool) -> Self {
        Self {
            name: name.into(),
            merged,
        }
    }
}

/// A tag as reported by source control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A branch or tag at the point in time the audit runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Branch(Branch),
    Tag(Tag),
}

impl Revision {
    pub fn name(&self) -> &str {
        match self {
            Revision::Branch(branch) => &branch.name,
            Revision::Tag(tag) => &tag.name,
        }
    }

    pub fn is_tag(&self) -> bool {
        matches!(self, Revision::Tag(_))
    }

    pub fn category(&self) -> RevisionCategory {
        classify(self.name(), self.is_tag())
    }

    /// Tags, and branches prefixed with `hotfix`, `release` or `master`
    pub fn is_release_track(&self) -> bool {
        match self {
            Revision::Tag(_) => true,
            Revision::Branch(branch) => has_any_prefix(&branch.name, RELEASE_TRACK_PREFIXES),
        }
    }
}

impl From<Branch> for Revision {
    fn from(branch: Branch) -> Self {
        Revision::Branch(branch)
    }
}

impl From<Tag> for Revision {
    fn from(tag: Tag) -> Self {
        Revision::Tag(tag)
    }
}

/// Branches that are currently being prepared for release (`hotfix*`, `release*`)
pub fn is_release_candidate(branch_name: &str) -> bool {
    has_any_prefix(branch_name, RELEASE_CANDIDATE_PREFIXES)
}

/// Branches whose declared versions are worth extracting
pub fn is_in_working_set(branch_name: &str) -> bool {
    has_any_prefix(branch_name, WORKING_SET_PREFIXES)
}

fn has_any_prefix(name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| name.starts_with(prefix))
}
