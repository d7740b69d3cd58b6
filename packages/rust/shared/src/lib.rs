//! Shared types, error model, and configuration for skilldocs.
//!
//! This crate is the foundation depended on by all other skilldocs crates.
//! It provides:
//! - [`SkillDocsError`] as the unified error type
//! - Domain types ([`PageManifest`], [`Category`], [`SkillMeta`], [`VersionInfo`])
//! - Configuration ([`SyncConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    CONFIG_FILE_NAME, DocCategory, DocEntry, DomainLabel, PathsConfig, SiteConfig, SyncConfig,
    load_config, load_config_from,
};
pub use error::{Result, SkillDocsError};
pub use types::{
    Category, DEFAULT_SKILL_DOMAIN, DocMeta, PageManifest, PageManifestEntry, SkillIndexEntry,
    SkillMeta, SkillMetadata, Skipped, VersionInfo, title_case,
};
