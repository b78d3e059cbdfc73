//! GitLab REST API (v4) source control implementation

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::audit::error::SourceError;
use crate::audit::revision::{Branch, Tag};
use crate::audit::source::SourceControl;
use crate::config::GITLAB_PAGE_SIZE;

/// Header carrying the next page number on paginated responses
const NEXT_PAGE_HEADER: &str = "x-next-page";

#[derive(Debug, Deserialize)]
struct BranchResponse {
    name: String,
    #[serde(default)]
    merged: bool,
}

#[derive(Debug, Deserialize)]
struct TagResponse {
    name: String,
}

/// Source control implementation for a GitLab instance
pub struct GitLabSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GitLabSource {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent("version-audit")
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn project_url(&self, repository: &str) -> String {
        format!(
            "{}/api/v4/projects/{}/repository",
            self.base_url,
            encode_component(repository)
        )
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.header("PRIVATE-TOKEN", token),
            None => request,
        }
    }

    /// Fetches every page of a repository listing
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        repository: &str,
        resource: &str,
    ) -> Result<Vec<T>, SourceError> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            let url = format!(
                "{}/{}?per_page={}&page={}",
                self.project_url(repository),
                resource,
                GITLAB_PAGE_SIZE,
                page
            );
            let response = self.get(&url).send().await?;
            let status = response.status();

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(SourceError::NotFound(repository.to_string()));
            }

            if !status.is_success() {
                warn!("GitLab returned status {}: {}", status, url);
                return Err(SourceError::InvalidResponse(format!(
                    "Unexpected status: {}",
                    status
                )));
            }

            let next_page = response
                .headers()
                .get(NEXT_PAGE_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok());

            let batch: Vec<T> = response.json().await.map_err(|e| {
                warn!("Failed to parse GitLab {} response: {}", resource, e);
                SourceError::InvalidResponse(e.to_string())
            })?;
            items.extend(batch);

            match next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        debug!("{}: {} {}", repository, items.len(), resource);
        Ok(items)
    }
}

#[async_trait::async_trait]
impl SourceControl for GitLabSource {
    async fn list_tags(&self, repository: &str) -> Result<Vec<Tag>, SourceError> {
        let tags: Vec<TagResponse> = self.get_all_pages(repository, "tags").await?;
        Ok(tags.into_iter().map(|t| Tag::new(t.name)).collect())
    }

    async fn list_branches(&self, repository: &str) -> Result<Vec<Branch>, SourceError> {
        let branches: Vec<BranchResponse> = self.get_all_pages(repository, "branches").await?;
        Ok(branches
            .into_iter()
            .map(|b| Branch::new(b.name, b.merged))
            .collect())
    }

    async fn get_file_text(
        &self,
        repository: &str,
        path: &str,
        revision: &str,
    ) -> Result<Option<String>, SourceError> {
        let url = format!(
            "{}/files/{}/raw?ref={}",
            self.project_url(repository),
            encode_component(path),
            encode_component(revision)
        );

        let response = self.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("{}: no {} at {}", repository, path, revision);
            return Ok(None);
        }

        if !status.is_success() {
            warn!("GitLab returned status {}: {}", status, url);
            return Err(SourceError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let text = response.text().await.map_err(|e| {
            warn!("Failed to read GitLab file response: {}", e);
            SourceError::InvalidResponse(e.to_string())
        })?;

        Ok(Some(text))
    }
}

/// Percent-encodes everything except RFC 3986 unreserved characters,
/// so `group/project` becomes `group%2Fproject`.
fn encode_component(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                result.push(byte as char)
            }
            _ => result.push_str(&format!("%{:02X}", byte)),
        }
    }
    result
}
