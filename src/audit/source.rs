//! Source control trait for listing revisions and reading files at a revision

#[cfg(test)]
use mockall::automock;

use crate::audit::error::SourceError;
use crate::audit::revision::{Branch, Tag};

/// Trait for querying a source control host
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait SourceControl: Send + Sync {
    /// Lists every tag of a repository
    async fn list_tags(&self, repository: &str) -> Result<Vec<Tag>, SourceError>;

    /// Lists every branch of a repository, with its merge status
    async fn list_branches(&self, repository: &str) -> Result<Vec<Branch>, SourceError>;

    /// Reads a file at a revision
    ///
    /// # Returns
    /// * `Ok(Some(text))` - File content
    /// * `Ok(None)` - The file does not exist at that revision
    /// * `Err(SourceError)` - The lookup itself failed
    async fn get_file_text(
        &self,
        repository: &str,
        path: &str,
        revision: &str,
    ) -> Result<Option<String>, SourceError>;
}
