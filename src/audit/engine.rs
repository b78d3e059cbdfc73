//! Runs a complete audit: library catalog, artifact cross-check, projects

use std::time::Instant;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::audit::artifact::ArtifactRepository;
use crate::audit::artifacts::cross_check;
use crate::audit::cache::FileCache;
use crate::audit::extract::Extractor;
use crate::audit::finding::{Finding, FindingKind, Findings, SubjectKind};
use crate::audit::library::build_catalog;
use crate::audit::project::{ProjectOutcome, ProjectProcessor};
use crate::audit::source::SourceControl;
use crate::config::AuditConfig;
use crate::report::{AuditReport, LibrarySummary};

/// Runs one audit pass over a point-in-time snapshot
///
/// Never fails: unavailable repositories and listings become findings and
/// the report carries whatever data could be obtained.
pub async fn run_audit(
    config: &AuditConfig,
    source: &dyn SourceControl,
    artifacts: &dyn ArtifactRepository,
) -> AuditReport {
    let started = Instant::now();
    let cache = FileCache::new();
    let extractor = Extractor::new(source, &cache);
    let library = &config.library;
    let mut findings = Findings::new();

    let (mut catalog, published) = tokio::join!(
        build_catalog(&extractor, library, config.options.concurrency, &mut findings),
        artifacts.list_published_versions()
    );
    info!("{}: {} versions in catalog", library.name, catalog.len());

    match published {
        Ok(published) => cross_check(&library.name, &catalog, &published, &mut findings),
        Err(e) => findings.push(Finding::new(
            FindingKind::ArtifactListingUnavailable,
            SubjectKind::Repository,
            &library.artifact_url,
            format!(
                "{} published artifacts could not be listed, cross-check skipped: {}",
                library.name, e
            ),
        )),
    }

    let outcomes: Vec<ProjectOutcome> = {
        let processor = ProjectProcessor::new(&extractor, &catalog, &config.rules, &library.name)
            .report_undetermined_versions(config.options.report_undetermined_versions);
        stream::iter(&config.projects)
            .map(|project| processor.process(project))
            .buffered(config.options.concurrency.max(1))
            .collect()
            .await
    };

    let mut projects = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        for (version, used_by) in outcome.usages {
            catalog.record_usage(&version, used_by);
        }
        findings.extend(outcome.findings);
        projects.push(outcome.project);
    }

    let elapsed = started.elapsed().as_secs_f64();
    match cache.len() {
        Ok(files) => info!(
            "Audit finished in {:.3}s: {} projects, {} findings, {} files fetched",
            elapsed,
            projects.len(),
            findings.len(),
            files
        ),
        Err(e) => {
            warn!("File cache unavailable: {}", e);
            info!(
                "Audit finished in {:.3}s: {} projects, {} findings",
                elapsed,
                projects.len(),
                findings.len()
            );
        }
    }

    AuditReport::new(
        LibrarySummary {
            name: library.name.clone(),
            repository: library.repository.clone(),
        },
        catalog,
        projects,
        findings,
    )
}
