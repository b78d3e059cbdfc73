//! End-to-end audit runs over in-memory repositories

mod helper;

use helper::{
    InMemorySource, LIBRARY_REPO, LIBRARY_VERSION_FILE, PROJECT_FILE, StaticArtifacts,
    project_file, test_config,
};
use version_audit::audit::catalog::UsedBy;
use version_audit::audit::finding::FindingKind;
use version_audit::audit::revision::RevisionCategory;
use version_audit::audit::run_audit;
use version_audit::report::AuditReport;

/// Library with tags 1.0.0 and 1.1.0 and a develop branch on 1.2.0-SNAPSHOT
fn library_source() -> InMemorySource {
    InMemorySource::new()
        .with_tag(LIBRARY_REPO, "1.0.0")
        .with_tag(LIBRARY_REPO, "1.1.0")
        .with_branch(LIBRARY_REPO, "develop", false)
        .with_file(
            LIBRARY_REPO,
            "develop",
            LIBRARY_VERSION_FILE,
            "version=1.2.0-SNAPSHOT\n",
        )
}

fn kinds(report: &AuditReport) -> Vec<FindingKind> {
    report.findings().map(|f| f.kind).collect()
}

#[tokio::test]
async fn library_catalog_and_artifact_cross_check() {
    let source = library_source();
    let artifacts = StaticArtifacts::published(&["1.0.0"]);

    let report = run_audit(&test_config(&[]), &source, &artifacts).await;

    let catalog: Vec<_> = report
        .catalog
        .iter()
        .map(|v| (v.name.as_str(), v.category))
        .collect();
    assert_eq!(
        catalog,
        vec![
            ("1.0.0", RevisionCategory::Released),
            ("1.1.0", RevisionCategory::Released),
            ("1.2.0-SNAPSHOT", RevisionCategory::Develop),
        ]
    );
    let findings: Vec<_> = report
        .findings()
        .map(|f| (f.kind, f.subject_id.as_str()))
        .collect();
    assert_eq!(findings, vec![(FindingKind::TaggedNotPublished, "1.1.0")]);
}

#[tokio::test]
async fn release_branch_on_released_library_version_is_clean() {
    let source = library_source()
        .with_branch("apps/billing", "release/2.0", false)
        .with_file(
            "apps/billing",
            "release/2.0",
            PROJECT_FILE,
            &project_file("2.0.0", Some("1.1.0")),
        );
    let artifacts = StaticArtifacts::published(&["1.0.0", "1.1.0"]);

    let report = run_audit(
        &test_config(&[("Billing", "apps/billing")]),
        &source,
        &artifacts,
    )
    .await;

    assert!(kinds(&report).is_empty());
    assert_eq!(
        report.catalog.get("1.1.0").unwrap().used_by,
        vec![UsedBy::new("apps/billing", "release/2.0")]
    );
    let billing = &report.projects[0];
    assert_eq!(billing.versions.len(), 1);
    assert_eq!(billing.versions[0].name, "2.0.0");
    assert_eq!(billing.versions[0].category, RevisionCategory::Release);
}

#[tokio::test]
async fn tag_depending_on_snapshot_is_reported() {
    let source = library_source()
        .with_tag("apps/billing", "v2.0")
        .with_file(
            "apps/billing",
            "v2.0",
            PROJECT_FILE,
            &project_file("2.0", Some("1.2.0-SNAPSHOT")),
        );
    let artifacts = StaticArtifacts::published(&["1.0.0", "1.1.0"]);

    let report = run_audit(
        &test_config(&[("Billing", "apps/billing")]),
        &source,
        &artifacts,
    )
    .await;

    assert_eq!(kinds(&report), vec![FindingKind::SnapshotDependency]);
    assert_eq!(
        report.findings().next().unwrap().subject_id,
        "apps/billing@v2.0"
    );
    assert_eq!(
        report.catalog.get("1.2.0-SNAPSHOT").unwrap().used_by,
        vec![UsedBy::new("apps/billing", "v2.0")]
    );
}

#[tokio::test]
async fn concurrent_release_branches_are_reported_once() {
    let source = library_source()
        .with_branch("apps/billing", "release/2.0", false)
        .with_branch("apps/billing", "hotfix/1.9.1", false);
    let artifacts = StaticArtifacts::published(&["1.0.0", "1.1.0"]);

    let report = run_audit(
        &test_config(&[("Billing", "apps/billing")]),
        &source,
        &artifacts,
    )
    .await;

    let multiple: Vec<_> = report
        .findings()
        .filter(|f| f.kind == FindingKind::MultipleReleaseBranches)
        .collect();
    assert_eq!(multiple.len(), 1);
    assert_eq!(multiple[0].subject_id, "apps/billing");
    assert!(multiple[0].message.contains("release/2.0"));
    assert!(multiple[0].message.contains("hotfix/1.9.1"));
}

#[tokio::test]
async fn merged_branch_is_reported_once_and_still_processed() {
    let source = library_source()
        .with_branch("apps/billing", "hotfix/1.9.1", true)
        .with_file(
            "apps/billing",
            "hotfix/1.9.1",
            PROJECT_FILE,
            &project_file("1.9.1", Some("1.1.0")),
        );
    let artifacts = StaticArtifacts::published(&["1.0.0", "1.1.0"]);

    let report = run_audit(
        &test_config(&[("Billing", "apps/billing")]),
        &source,
        &artifacts,
    )
    .await;

    assert_eq!(kinds(&report), vec![FindingKind::StaleBranch]);
    assert_eq!(report.projects[0].versions[0].source_revision, "hotfix/1.9.1");
    assert_eq!(report.catalog.get("1.1.0").unwrap().used_by.len(), 1);
}

#[tokio::test]
async fn used_by_grows_in_processing_order_across_projects() {
    let mut source = library_source();
    for (repository, revisions) in [
        ("apps/billing", ["develop", "master"]),
        ("apps/shipping", ["master", "release/3.1"]),
        ("apps/invoicing", ["develop", "hotfix/0.9.1"]),
    ] {
        for revision in revisions {
            source = source.with_branch(repository, revision, false).with_file(
                repository,
                revision,
                PROJECT_FILE,
                &project_file("1.0.0", Some("1.1.0")),
            );
        }
    }
    let artifacts = StaticArtifacts::published(&["1.0.0", "1.1.0"]);

    let report = run_audit(
        &test_config(&[
            ("Billing", "apps/billing"),
            ("Shipping", "apps/shipping"),
            ("Invoicing", "apps/invoicing"),
        ]),
        &source,
        &artifacts,
    )
    .await;

    assert_eq!(
        report.catalog.get("1.1.0").unwrap().used_by,
        vec![
            UsedBy::new("apps/billing", "develop"),
            UsedBy::new("apps/billing", "master"),
            UsedBy::new("apps/shipping", "master"),
            UsedBy::new("apps/shipping", "release/3.1"),
            UsedBy::new("apps/invoicing", "develop"),
            UsedBy::new("apps/invoicing", "hotfix/0.9.1"),
        ]
    );
    let names: Vec<_> = report.projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Billing", "Shipping", "Invoicing"]);
}

#[tokio::test]
async fn missing_repository_does_not_stop_the_run() {
    let source = library_source()
        .with_branch("apps/billing", "develop", false)
        .with_file(
            "apps/billing",
            "develop",
            PROJECT_FILE,
            &project_file("2.1.0-SNAPSHOT", Some("0.1.0")),
        );
    let artifacts = StaticArtifacts::published(&["1.0.0", "1.1.0"]);

    let report = run_audit(
        &test_config(&[("Gone", "apps/gone"), ("Billing", "apps/billing")]),
        &source,
        &artifacts,
    )
    .await;

    assert_eq!(
        kinds(&report),
        vec![
            FindingKind::RepositoryUnavailable,
            FindingKind::UnknownLibraryVersion
        ]
    );
    assert_eq!(report.projects.len(), 2);
    assert!(report.projects[0].versions.is_empty());
    assert_eq!(report.projects[1].versions[0].name, "2.1.0-SNAPSHOT");
}

#[tokio::test]
async fn unavailable_artifact_listing_skips_cross_check() {
    let source = library_source();
    let artifacts = StaticArtifacts::unavailable();

    let report = run_audit(&test_config(&[]), &source, &artifacts).await;

    assert_eq!(kinds(&report), vec![FindingKind::ArtifactListingUnavailable]);
    assert_eq!(report.catalog.len(), 3);
}

#[tokio::test]
async fn missing_library_repository_leaves_catalog_empty() {
    let source = InMemorySource::new()
        .with_branch("apps/billing", "develop", false)
        .with_file(
            "apps/billing",
            "develop",
            PROJECT_FILE,
            &project_file("1.0.0", Some("1.1.0")),
        );
    let artifacts = StaticArtifacts::published(&[]);

    let report = run_audit(
        &test_config(&[("Billing", "apps/billing")]),
        &source,
        &artifacts,
    )
    .await;

    assert!(report.catalog.is_empty());
    assert_eq!(
        kinds(&report),
        vec![
            FindingKind::RepositoryUnavailable,
            FindingKind::UnknownLibraryVersion
        ]
    );
}

#[tokio::test]
async fn each_file_is_fetched_once_per_revision() {
    let source = library_source()
        .with_branch("apps/billing", "develop", false)
        .with_branch("apps/billing", "master", false)
        .with_tag("apps/billing", "1.0.0")
        .with_file(
            "apps/billing",
            "develop",
            PROJECT_FILE,
            &project_file("1.1.0-SNAPSHOT", Some("1.2.0-SNAPSHOT")),
        )
        .with_file(
            "apps/billing",
            "master",
            PROJECT_FILE,
            &project_file("1.0.0", Some("1.1.0")),
        );
    let artifacts = StaticArtifacts::published(&["1.0.0", "1.1.0"]);

    let report = run_audit(
        &test_config(&[("Billing", "apps/billing")]),
        &source,
        &artifacts,
    )
    .await;

    // one library branch, three project revisions sharing one file for both rules
    assert_eq!(source.file_fetches(), 4);
    assert_eq!(report.projects[0].versions.len(), 2);
}

#[tokio::test]
async fn repository_without_revisions_has_no_versions() {
    let source = library_source().with_repository("apps/empty");
    let artifacts = StaticArtifacts::published(&["1.0.0", "1.1.0"]);

    let report = run_audit(
        &test_config(&[("Empty", "apps/empty")]),
        &source,
        &artifacts,
    )
    .await;

    assert!(kinds(&report).is_empty());
    assert_eq!(report.projects[0].name, "Empty");
    assert!(report.projects[0].latest_version().is_none());
    assert!(report.render_text().contains("Empty: unknown -> not using Core"));
}
