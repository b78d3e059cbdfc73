//! The catalog of known shared-library versions

use indexmap::IndexMap;
use serde::Serialize;

use crate::audit::precedence::{compare_precedence, latest};
use crate::audit::revision::RevisionCategory;

/// A project revision that declared a dependency on a library version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsedBy {
    pub repository: String,
    pub revision: String,
}

impl UsedBy {
    pub fn new(repository: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            revision: revision.into(),
        }
    }
}

/// One distinct version of the shared library
///
/// Identity is the version name; `used_by` only ever grows.
#[derive(Debug, Clone, Serialize)]
pub struct LibraryVersion {
    pub name: String,
    pub category: RevisionCategory,
    /// Branch or tag the version was read from
    pub source_revision: String,
    pub used_by: Vec<UsedBy>,
}

impl LibraryVersion {
    pub fn new(
        name: impl Into<String>,
        category: RevisionCategory,
        source_revision: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            source_revision: source_revision.into(),
            used_by: Vec::new(),
        }
    }

    /// A version taken from a tag: named after the tag, always `Released`
    pub fn from_tag(tag_name: &str) -> Self {
        Self::new(tag_name, RevisionCategory::Released, tag_name)
    }

    pub fn is_released(&self) -> bool {
        self.category == RevisionCategory::Released
    }

    pub fn is_in_use(&self) -> bool {
        !self.used_by.is_empty()
    }
}

impl PartialEq for LibraryVersion {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for LibraryVersion {}

impl std::fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.name, self.source_revision)
    }
}

/// Library versions keyed by name, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    versions: IndexMap<String, LibraryVersion>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a version unless one with the same name is already present
    ///
    /// The first entry seen for a name keeps its category and source.
    /// Returns `false` when the name was already known.
    pub fn insert(&mut self, version: LibraryVersion) -> bool {
        if self.versions.contains_key(&version.name) {
            return false;
        }
        self.versions.insert(version.name.clone(), version);
        true
    }

    pub fn get(&self, name: &str) -> Option<&LibraryVersion> {
        self.versions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.versions.contains_key(name)
    }

    /// Appends a back-reference to the named version
    ///
    /// Returns `false` if the version is not in the catalog.
    pub fn record_usage(&mut self, name: &str, used_by: UsedBy) -> bool {
        match self.versions.get_mut(name) {
            Some(version) => {
                version.used_by.push(used_by);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Versions in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &LibraryVersion> {
        self.versions.values()
    }

    pub fn released(&self) -> impl Iterator<Item = &LibraryVersion> {
        self.iter().filter(|v| v.is_released())
    }

    /// Versions ordered newest first
    pub fn sorted_desc(&self) -> Vec<&LibraryVersion> {
        let mut versions: Vec<_> = self.iter().collect();
        versions.sort_by(|a, b| compare_precedence(&b.name, &a.name));
        versions
    }

    /// The highest tagged version
    pub fn latest_released(&self) -> Option<&LibraryVersion> {
        latest(self.released(), |v| v.name.as_str())
    }
}

/// Serialized as a list in insertion order
impl Serialize for Catalog {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.versions.values())
    }
}

impl FromIterator<LibraryVersion> for Catalog {
    fn from_iter<I: IntoIterator<Item = LibraryVersion>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for version in iter {
            catalog.insert(version);
        }
        catalog
    }
}
