//! Artifact repository read from an HTML/text listing page
//!
//! Works with directory-style listings such as a Nexus or Maven repository
//! browse page: the page is fetched as text and every match of the
//! configured pattern is taken as one published version.

use std::time::Duration;

use indexmap::IndexSet;
use regex::Regex;
use tracing::{debug, warn};

use crate::audit::artifact::ArtifactRepository;
use crate::audit::error::ArtifactError;

pub struct ListingPageRepository {
    client: reqwest::Client,
    url: String,
    pattern: Regex,
}

impl ListingPageRepository {
    pub fn new(url: &str, pattern: Regex, timeout: Duration) -> Result<Self, ArtifactError> {
        let client = reqwest::Client::builder()
            .user_agent("version-audit")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            pattern,
        })
    }
}

/// All matches of `pattern` in `page`, first capture group if the pattern has one
///
/// Listing pages usually mention a version more than once (link target and
/// link text), so duplicates are dropped keeping the first occurrence.
pub fn find_versions(page: &str, pattern: &Regex) -> Vec<String> {
    let versions: IndexSet<String> = pattern
        .captures_iter(page)
        .filter_map(|captures| captures.get(1).or_else(|| captures.get(0)))
        .map(|m| m.as_str().to_string())
        .collect();
    versions.into_iter().collect()
}

#[async_trait::async_trait]
impl ArtifactRepository for ListingPageRepository {
    async fn list_published_versions(&self) -> Result<Vec<String>, ArtifactError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!("Artifact listing returned status {}: {}", status, self.url);
            return Err(ArtifactError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let page = response.text().await.map_err(|e| {
            warn!("Failed to read artifact listing: {}", e);
            ArtifactError::InvalidResponse(e.to_string())
        })?;

        let versions = find_versions(&page, &self.pattern);
        debug!("{} published versions listed at {}", versions.len(), self.url);
        Ok(versions)
    }
}
