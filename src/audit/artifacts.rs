//! Cross-checks the library catalog against published artifacts

use indexmap::IndexSet;

use crate::audit::catalog::Catalog;
use crate::audit::finding::{Finding, FindingKind, Findings, SubjectKind};

/// Marker of a pre-release build
pub const SNAPSHOT_MARKER: &str = "SNAPSHOT";

pub fn is_snapshot(version: &str) -> bool {
    version.contains(SNAPSHOT_MARKER)
}

/// Compares tagged and declared library versions with the published list
///
/// Four independent passes:
/// - published versions with no matching tag
/// - pre-release versions on the release channel (one batched finding)
/// - published versions only known from a branch, which must be tagged
/// - tagged versions that were never published
pub fn cross_check(
    library_name: &str,
    catalog: &Catalog,
    published: &[String],
    findings: &mut Findings,
) {
    let published: IndexSet<&str> = published.iter().map(String::as_str).collect();
    let tagged: IndexSet<&str> = catalog.released().map(|v| v.name.as_str()).collect();

    for version in published.iter().filter(|v| !tagged.contains(*v)) {
        findings.push(Finding::new(
            FindingKind::PublishedNotTagged,
            SubjectKind::LibraryVersion,
            *version,
            format!(
                "{} artifact version '{}' is published but not tagged",
                library_name, version
            ),
        ));
    }

    let snapshots: Vec<&str> = published.iter().copied().filter(|v| is_snapshot(v)).collect();
    if !snapshots.is_empty() {
        findings.push(Finding::new(
            FindingKind::SnapshotPublished,
            SubjectKind::LibraryVersion,
            snapshots.join(", "),
            format!(
                "{} snapshot versions on the release channel: {:?}",
                library_name, snapshots
            ),
        ));
    }

    for version in catalog.iter() {
        let is_published = published.contains(version.name.as_str());
        if is_published && !version.is_released() {
            findings.push(Finding::new(
                FindingKind::MustBeTagged,
                SubjectKind::LibraryVersion,
                &version.name,
                format!(
                    "{} version '{}' (rev '{}') is published and must be tagged",
                    library_name, version.name, version.source_revision
                ),
            ));
        } else if !is_published && version.is_released() {
            findings.push(Finding::new(
                FindingKind::TaggedNotPublished,
                SubjectKind::LibraryVersion,
                &version.name,
                format!(
                    "{} version '{}' (rev '{}') is tagged but not published",
                    library_name, version.name, version.source_revision
                ),
            ));
        }
    }
}
