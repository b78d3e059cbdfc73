//! In-memory source control and artifact repository for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use version_audit::audit::artifact::ArtifactRepository;
use version_audit::audit::error::{ArtifactError, SourceError};
use version_audit::audit::revision::{Branch, Tag};
use version_audit::audit::source::SourceControl;

#[derive(Default)]
struct RepositoryFixture {
    tags: Vec<Tag>,
    branches: Vec<Branch>,
    /// (revision, path) -> content
    files: HashMap<(String, String), String>,
}

/// Source control backed by fixtures; unknown repositories are not found
#[derive(Default)]
pub struct InMemorySource {
    repositories: HashMap<String, RepositoryFixture>,
    file_fetches: AtomicUsize,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, repository: &str) -> Self {
        self.repositories
            .entry(repository.to_string())
            .or_default();
        self
    }

    pub fn with_tag(mut self, repository: &str, tag: &str) -> Self {
        self.fixture(repository).tags.push(Tag::new(tag));
        self
    }

    pub fn with_branch(mut self, repository: &str, branch: &str, merged: bool) -> Self {
        self.fixture(repository)
            .branches
            .push(Branch::new(branch, merged));
        self
    }

    pub fn with_file(mut self, repository: &str, revision: &str, path: &str, content: &str) -> Self {
        self.fixture(repository)
            .files
            .insert((revision.to_string(), path.to_string()), content.to_string());
        self
    }

    /// Number of file lookups that reached this source
    pub fn file_fetches(&self) -> usize {
        self.file_fetches.load(Ordering::SeqCst)
    }

    fn fixture(&mut self, repository: &str) -> &mut RepositoryFixture {
        self.repositories
            .entry(repository.to_string())
            .or_default()
    }

    fn get(&self, repository: &str) -> Result<&RepositoryFixture, SourceError> {
        self.repositories
            .get(repository)
            .ok_or_else(|| SourceError::NotFound(repository.to_string()))
    }
}

#[async_trait]
impl SourceControl for InMemorySource {
    async fn list_tags(&self, repository: &str) -> Result<Vec<Tag>, SourceError> {
        Ok(self.get(repository)?.tags.clone())
    }

    async fn list_branches(&self, repository: &str) -> Result<Vec<Branch>, SourceError> {
        Ok(self.get(repository)?.branches.clone())
    }

    async fn get_file_text(
        &self,
        repository: &str,
        path: &str,
        revision: &str,
    ) -> Result<Option<String>, SourceError> {
        self.file_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .get(repository)?
            .files
            .get(&(revision.to_string(), path.to_string()))
            .cloned())
    }
}

/// Artifact repository returning a fixed list, or failing when `None`
pub struct StaticArtifacts(pub Option<Vec<String>>);

impl StaticArtifacts {
    pub fn published(versions: &[&str]) -> Self {
        Self(Some(versions.iter().map(|v| v.to_string()).collect()))
    }

    pub fn unavailable() -> Self {
        Self(None)
    }
}

#[async_trait]
impl ArtifactRepository for StaticArtifacts {
    async fn list_published_versions(&self) -> Result<Vec<String>, ArtifactError> {
        self.0
            .clone()
            .ok_or_else(|| ArtifactError::InvalidResponse("Unexpected status: 503".to_string()))
    }
}
