//! Version extraction from file contents

use regex::Regex;
use tracing::{debug, error};

use crate::audit::cache::FileCache;
use crate::audit::source::SourceControl;

/// Where to look for a version declaration and how to recognise it
#[derive(Debug, Clone)]
pub struct ExtractionRule {
    pub path: String,
    /// Pattern with one capture group holding the version
    pub pattern: Regex,
}

impl ExtractionRule {
    pub fn new(path: impl Into<String>, pattern: Regex) -> Self {
        Self {
            path: path.into(),
            pattern,
        }
    }
}

/// Returns the first capture group of the first match, if any
pub fn extract(text: &str, pattern: &Regex) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str().to_string())
}

/// Reads version declarations out of repository files through the shared cache
pub struct Extractor<'a> {
    source: &'a dyn SourceControl,
    cache: &'a FileCache,
}

impl<'a> Extractor<'a> {
    pub fn new(source: &'a dyn SourceControl, cache: &'a FileCache) -> Self {
        Self { source, cache }
    }

    pub fn source(&self) -> &'a dyn SourceControl {
        self.source
    }

    /// Applies a single rule to a file at a revision
    pub async fn extract_at(
        &self,
        repository: &str,
        revision: &str,
        rule: &ExtractionRule,
    ) -> Option<String> {
        let text = self
            .cache
            .fetch_text(self.source, repository, &rule.path, revision)
            .await
            .inspect_err(|e| error!("File cache unavailable: {}", e))
            .ok()
            .flatten()?;

        extract(&text, &rule.pattern)
    }

    /// Tries rules in order and returns the first value found
    pub async fn first_match(
        &self,
        repository: &str,
        revision: &str,
        rules: &[ExtractionRule],
    ) -> Option<String> {
        for rule in rules {
            if let Some(value) = self.extract_at(repository, revision, rule).await {
                debug!(
                    "{} at {}: '{}' found in {}",
                    repository, revision, value, rule.path
                );
                return Some(value);
            }
        }
        None
    }
}
