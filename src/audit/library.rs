//! Builds the catalog of shared-library versions from its tags and branches

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::audit::catalog::{Catalog, LibraryVersion};
use crate::audit::extract::Extractor;
use crate::audit::finding::{Finding, FindingKind, Findings, SubjectKind};
use crate::audit::revision::{Branch, RevisionCategory, Tag};
use crate::config::LibraryConfig;

/// Lists the library's revisions and builds its version catalog
///
/// Tags contribute a `Released` version named after the tag. Branches
/// contribute the version declared in the configured file, when one can be
/// read, with at most `concurrency` files fetched at a time. If the
/// repository cannot be listed the catalog is empty and a finding explains
/// why.
pub async fn build_catalog(
    extractor: &Extractor<'_>,
    library: &LibraryConfig,
    concurrency: usize,
    findings: &mut Findings,
) -> Catalog {
    let source = extractor.source();
    let listing = tokio::try_join!(
        source.list_tags(&library.repository),
        source.list_branches(&library.repository)
    );

    let (tags, branches) = match listing {
        Ok(listing) => listing,
        Err(e) => {
            findings.push(Finding::new(
                FindingKind::RepositoryUnavailable,
                SubjectKind::Repository,
                &library.repository,
                format!(
                    "{} repository '{}' could not be listed: {}",
                    library.name, library.repository, e
                ),
            ));
            return Catalog::new();
        }
    };

    info!(
        "{}: {} tags, {} branches",
        library.name,
        tags.len(),
        branches.len()
    );

    let declared: Vec<Option<String>> = stream::iter(&branches)
        .map(|branch| {
            extractor.extract_at(&library.repository, &branch.name, &library.version_rule)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    assemble_catalog(library, &tags, branches.iter().zip(declared), findings)
}

/// Unions tag-derived and branch-derived versions, first seen wins
fn assemble_catalog<'b, I>(
    library: &LibraryConfig,
    tags: &[Tag],
    branches: I,
    findings: &mut Findings,
) -> Catalog
where
    I: IntoIterator<Item = (&'b Branch, Option<String>)>,
{
    let mut catalog: Catalog = tags
        .iter()
        .map(|tag| LibraryVersion::from_tag(&tag.name))
        .collect();

    for (branch, declared) in branches {
        if branch.merged {
            findings.push(stale_branch(&library.name, &library.repository, branch));
        }

        let Some(version) = declared else {
            debug!("{}: no version declared on {}", library.name, branch.name);
            continue;
        };

        let category = RevisionCategory::from_branch_name(&branch.name);
        if !catalog.insert(LibraryVersion::new(&version, category, &branch.name)) {
            let kept = catalog.get(&version).map(|v| v.source_revision.as_str());
            debug!(
                "{}: version '{}' on {} already known from {}",
                library.name,
                version,
                branch.name,
                kept.unwrap_or_default()
            );
        }
    }

    catalog
}

/// Finding for a branch that has been merged and can be deleted
pub fn stale_branch(display_name: &str, repository: &str, branch: &Branch) -> Finding {
    Finding::new(
        FindingKind::StaleBranch,
        SubjectKind::ProjectRevision,
        format!("{}@{}", repository, branch.name),
        format!(
            "{} revision '{}' has already been merged. It can be deleted",
            display_name, branch.name
        ),
    )
}
