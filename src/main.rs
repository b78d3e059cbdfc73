use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use version_audit::audit::remotes::{GitLabSource, ListingPageRepository};
use version_audit::audit::run_audit;
use version_audit::config::{AuditConfig, default_config_path};
use version_audit::logging::init_tracing;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "version-audit")]
#[command(
    version,
    about = "Audit version declarations of a shared library and the repositories using it"
)]
struct Cli {
    /// Config file (defaults to $XDG_CONFIG_HOME/version-audit/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Record a finding for revisions whose version cannot be determined
    #[arg(long)]
    report_undetermined: bool,

    /// Exit with status 1 when the audit records any finding
    #[arg(long)]
    fail_on_findings: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = init_tracing(&cli.log_level, cli.log_json, cli.log_file.as_deref());

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = AuditConfig::load(&config_path)
        .with_context(|| format!("Invalid configuration in {}", config_path.display()))?;
    config.options.report_undetermined_versions |= cli.report_undetermined;

    let source = GitLabSource::new(
        &config.gitlab.url,
        config.gitlab.token.clone(),
        config.options.fetch_timeout,
    )?;
    let artifacts = ListingPageRepository::new(
        &config.library.artifact_url,
        config.library.artifact_pattern.clone(),
        config.options.fetch_timeout,
    )?;

    let report = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run_audit(&config, &source, &artifacts));

    match cli.format {
        Format::Text => print!("{}", report.render_text()),
        Format::Json => println!("{}", report.to_json()?),
    }

    if cli.fail_on_findings && !report.findings.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
