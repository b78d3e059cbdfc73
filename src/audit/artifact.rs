//! Artifact repository trait for listing published versions

#[cfg(test)]
use mockall::automock;

use crate::audit::error::ArtifactError;

/// Trait for listing the versions of an artifact that have been published
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Returns every published version string, duplicates removed, in listing order
    async fn list_published_versions(&self) -> Result<Vec<String>, ArtifactError>;
}
