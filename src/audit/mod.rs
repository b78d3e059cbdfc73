//! Version reconciliation engine
//!
//! Reads which versions each revision of the shared library and of the
//! tracked projects declares, checks them against tagging discipline and
//! published artifacts, and records every inconsistency as a finding.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌──────────────┐
//! │SourceControl │────▶│  FileCache  │◀────│  Extractor   │
//! │  (remotes)   │     │ (per run)   │     │ (rules/regex)│
//! └──────────────┘     └─────────────┘     └──────────────┘
//!                                             │        │
//!                                             ▼        ▼
//! ┌──────────────┐     ┌─────────────┐     ┌──────────────┐
//! │  Artifact    │────▶│  Artifacts  │◀────│   Library    │
//! │  Repository  │     │(cross-check)│     │  (catalog)   │
//! └──────────────┘     └─────────────┘     └──────────────┘
//!                                                 │
//!                                                 ▼
//!                                          ┌──────────────┐
//!                                          │   Project    │
//!                                          │ (processor)  │
//!                                          └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`revision`]: Branch/tag types and lifecycle classification
//! - [`source`]: Source control trait
//! - [`artifact`]: Artifact repository trait
//! - [`cache`]: Per-run file content cache
//! - [`extract`]: Version extraction rules
//! - [`catalog`]: Library versions and their users
//! - [`library`]: Catalog construction from the library repository
//! - [`artifacts`]: Catalog versus published artifacts
//! - [`project`]: Per-repository revision processing
//! - [`finding`]: Audit findings
//! - [`precedence`]: Ordering of version strings
//! - [`engine`]: Full audit run
//! - [`remotes`]: GitLab and listing-page implementations
//! - [`error`]: Error types for cache and remote operations

pub mod artifact;
pub mod artifacts;
pub mod cache;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod extract;
pub mod finding;
pub mod library;
pub mod precedence;
pub mod project;
pub mod remotes;
pub mod revision;
pub mod source;

pub use engine::run_audit;
