//! Pipeline configuration.
//!
//! Lives at `<repo>/skilldocs.toml`. The file is optional: every field has a
//! default matching the repository's standard layout, so a bare checkout
//! syncs with no configuration at all.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkillDocsError};
use crate::types::title_case;

/// Default configuration file name, looked up at the repository root.
pub const CONFIG_FILE_NAME: &str = "skilldocs.toml";

// ---------------------------------------------------------------------------
// Config structs (matching skilldocs.toml schema)
// ---------------------------------------------------------------------------

/// Top-level pipeline config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Source and output locations, relative to the repository root.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Site-wide settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Table of top-level docs.
    #[serde(default = "default_core_docs")]
    pub core_docs: Vec<DocEntry>,

    /// Table of guide docs, published under `guides/`.
    #[serde(default = "default_guides")]
    pub guides: Vec<DocEntry>,

    /// Skill domains in display order.
    #[serde(default = "default_domains")]
    pub domains: Vec<DomainLabel>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            site: SiteConfig::default(),
            core_docs: default_core_docs(),
            guides: default_guides(),
            domains: default_domains(),
        }
    }
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Normalized content tree consumed by the site generator.
    #[serde(default = "default_content_dir")]
    pub content_dir: PathBuf,

    /// Static public directory receiving mirrors and `llms*.txt`.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,

    /// Workflow documents, enumerated at build time.
    #[serde(default = "default_workflow_dir")]
    pub workflow_dir: PathBuf,

    /// One subdirectory per skill, each with a `SKILL.md`.
    #[serde(default = "default_skills_dir")]
    pub skills_dir: PathBuf,

    /// Workflow command files (only counted, never synced).
    #[serde(default = "default_commands_dir")]
    pub commands_dir: PathBuf,

    /// Project counters and version.
    #[serde(default = "default_version_file")]
    pub version_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            content_dir: default_content_dir(),
            public_dir: default_public_dir(),
            workflow_dir: default_workflow_dir(),
            skills_dir: default_skills_dir(),
            commands_dir: default_commands_dir(),
            version_file: default_version_file(),
        }
    }
}

fn default_content_dir() -> PathBuf {
    "site/src/content/docs".into()
}
fn default_public_dir() -> PathBuf {
    "site/public".into()
}
fn default_workflow_dir() -> PathBuf {
    "docs/workflow".into()
}
fn default_skills_dir() -> PathBuf {
    "skills".into()
}
fn default_commands_dir() -> PathBuf {
    "commands/project".into()
}
fn default_version_file() -> PathBuf {
    "version.json".into()
}

/// `[site]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base path the site is served under (`""` or `/name`, no trailing slash).
    #[serde(default = "default_base")]
    pub base: String,

    /// Heading used by `llms.txt` and the landing mirror.
    #[serde(default = "default_project_name")]
    pub project_name: String,

    /// One-line summary quoted under the heading.
    #[serde(default = "default_tagline")]
    pub tagline: String,

    /// Blob URL prefix of the source repository, for skill reference links.
    #[serde(default = "default_repo_blob_url")]
    pub repo_blob_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            project_name: default_project_name(),
            tagline: default_tagline(),
            repo_blob_url: default_repo_blob_url(),
        }
    }
}

fn default_base() -> String {
    "/claude-skills".into()
}
fn default_project_name() -> String {
    "Claude Skills".into()
}
fn default_tagline() -> String {
    "Specialized skills and project workflow commands for AI coding agents.".into()
}
fn default_repo_blob_url() -> String {
    "https://github.com/jeffallan/claude-skills/blob/main".into()
}

/// Where a table-driven doc is filed in the manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocCategory {
    #[default]
    Docs,
    Project,
}

/// `[[core_docs]]` / `[[guides]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    /// Source path relative to the repository root.
    pub source: String,
    /// Destination slug (URL segment and file stem).
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Shorter sidebar text than the title; rendered as `sidebar.label`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar_label: Option<String>,
    /// Rendered as `sidebar.order`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    /// Ignored for guides, which are always filed under `guides`.
    #[serde(default)]
    pub category: DocCategory,
}

impl DocEntry {
    fn new(source: &str, slug: &str, title: &str, description: &str) -> Self {
        Self {
            source: source.into(),
            slug: slug.into(),
            title: title.into(),
            description: Some(description.into()),
            sidebar_label: None,
            order: None,
            category: DocCategory::Docs,
        }
    }

    fn order(mut self, order: u32) -> Self {
        self.order = Some(order);
        self
    }

    fn project(mut self) -> Self {
        self.category = DocCategory::Project;
        self
    }
}

fn default_core_docs() -> Vec<DocEntry> {
    vec![
        DocEntry::new(
            "QUICKSTART.md",
            "getting-started",
            "Getting Started",
            "Install the skills plugin and run your first workflow.",
        )
        .order(1),
        DocEntry::new(
            "SKILLS_GUIDE.md",
            "skills-guide",
            "Skills Guide",
            "How skills activate and which one to reach for.",
        )
        .order(2),
        DocEntry::new(
            "docs/WORKFLOW_COMMANDS.md",
            "workflow-commands",
            "Workflow Commands",
            "Project workflow commands from discovery to retrospective.",
        )
        .order(3),
        DocEntry::new(
            "CONTRIBUTING.md",
            "contributing",
            "Contributing",
            "How to propose, write, and review new skills.",
        )
        .project(),
        DocEntry::new(
            "CHANGELOG.md",
            "changelog",
            "Changelog",
            "Release history.",
        )
        .project(),
        DocEntry::new(
            "ROADMAP.md",
            "roadmap",
            "Roadmap",
            "Planned skills and improvements.",
        )
        .project(),
    ]
}

fn default_guides() -> Vec<DocEntry> {
    vec![
        DocEntry::new(
            "docs/LOCAL_DEVELOPMENT.md",
            "local-development",
            "Local Development",
            "Work on skills locally and test them against a live agent.",
        )
        .order(1),
        DocEntry::new(
            "docs/SUPPORTED_FRAMEWORKS.md",
            "supported-frameworks",
            "Supported Frameworks",
            "Languages and frameworks covered by the skill set.",
        )
        .order(2),
        DocEntry::new(
            "docs/ATLASSIAN_MCP_SETUP.md",
            "atlassian-mcp-setup",
            "Atlassian MCP Setup",
            "Connect Jira and Confluence for the workflow commands.",
        )
        .order(3),
    ]
}

/// `[[domains]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainLabel {
    pub id: String,
    pub label: String,
}

fn default_domains() -> Vec<DomainLabel> {
    [
        ("language", "Languages"),
        ("backend", "Backend Frameworks"),
        ("frontend", "Frontend & Mobile"),
        ("infrastructure", "Infrastructure"),
        ("api-architecture", "API & Architecture"),
        ("quality", "Quality & Testing"),
        ("devops", "DevOps & Operations"),
        ("security", "Security"),
        ("data-ml", "Data & Machine Learning"),
        ("platform", "Platform Specialists"),
        ("specialized", "Specialized"),
        ("workflow", "Workflow"),
    ]
    .into_iter()
    .map(|(id, label)| DomainLabel {
        id: id.into(),
        label: label.into(),
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

impl SyncConfig {
    /// Site URL for a page path: `<base>/<path>/`.
    pub fn site_url(&self, path: &str) -> String {
        format!("{}/{}/", self.site.base, path.trim_matches('/'))
    }

    /// Display label for a domain id; unknown ids are title-cased.
    pub fn domain_label(&self, id: &str) -> String {
        self.domains
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.label.clone())
            .unwrap_or_else(|| title_case(id))
    }

    /// Sort key for a domain: table position, unknown ids after all known ones.
    pub fn domain_rank(&self, id: &str) -> (usize, String) {
        let pos = self
            .domains
            .iter()
            .position(|d| d.id == id)
            .unwrap_or(self.domains.len());
        (pos, id.to_string())
    }

    /// Check table consistency before anything touches the filesystem.
    pub fn validate(&self) -> Result<()> {
        let base = &self.site.base;
        if !base.is_empty() && (!base.starts_with('/') || base.ends_with('/')) {
            return Err(SkillDocsError::config(format!(
                "site.base must be empty or start with '/' and not end with '/', got '{base}'"
            )));
        }

        for (table, entries) in [("core_docs", &self.core_docs), ("guides", &self.guides)] {
            let mut seen = std::collections::BTreeSet::new();
            for entry in entries {
                let slug = entry.slug.trim_matches('/');
                if slug.is_empty() {
                    return Err(SkillDocsError::config(format!(
                        "{table}: empty slug for {}",
                        entry.source
                    )));
                }
                if slug.split('/').any(|s| s.is_empty() || s == "." || s == "..") {
                    return Err(SkillDocsError::config(format!(
                        "{table}: slug '{slug}' must be plain path segments"
                    )));
                }
                if !seen.insert(slug) {
                    return Err(SkillDocsError::config(format!(
                        "{table}: duplicate slug '{slug}'"
                    )));
                }
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load config for a repository root.
///
/// An explicit path must exist. Without one, `<root>/skilldocs.toml` is used
/// when present, otherwise defaults.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<SyncConfig> {
    let config = match explicit {
        Some(path) => load_config_from(path)?,
        None => {
            let path = root.join(CONFIG_FILE_NAME);
            if path.exists() {
                load_config_from(&path)?
            } else {
                tracing::debug!(?path, "config file not found, using defaults");
                SyncConfig::default()
            }
        }
    };

    config.validate()?;
    Ok(config)
}

/// Load the pipeline config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<SyncConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SkillDocsError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SkillDocsError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = SyncConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("content_dir"));
        assert!(toml_str.contains("getting-started"));
    }

    #[test]
    fn config_roundtrip() {
        let config = SyncConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: SyncConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.site.base, "/claude-skills");
        assert_eq!(parsed.core_docs, config.core_docs);
        assert_eq!(parsed.domains.len(), 12);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let toml_str = r#"
[site]
base = "/docs"

[[guides]]
source = "docs/guides/setup.md"
slug = "setup"
title = "Setup"
sidebar_label = "Setup"
"#;
        let config: SyncConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.site.base, "/docs");
        assert_eq!(config.guides[0].sidebar_label.as_deref(), Some("Setup"));
        assert_eq!(config.guides[0].order, None);
        assert_eq!(config.site.project_name, "Claude Skills");
        assert_eq!(config.guides.len(), 1);
        assert_eq!(config.guides[0].category, DocCategory::Docs);
        assert_eq!(config.core_docs.len(), 6);
        assert_eq!(config.paths.skills_dir, PathBuf::from("skills"));
    }

    #[test]
    fn site_url_and_domain_helpers() {
        let config = SyncConfig::default();
        assert_eq!(
            config.site_url("skills/language/python-pro"),
            "/claude-skills/skills/language/python-pro/"
        );
        assert_eq!(config.domain_label("data-ml"), "Data & Machine Learning");
        assert_eq!(config.domain_label("game-dev"), "Game Dev");
        assert!(config.domain_rank("language") < config.domain_rank("backend"));
        assert!(config.domain_rank("workflow") < config.domain_rank("zzz"));
    }

    #[test]
    fn validate_rejects_bad_base_and_duplicate_slugs() {
        let mut config = SyncConfig::default();
        config.site.base = "docs/".into();
        assert!(config.validate().is_err());

        let mut config = SyncConfig::default();
        config.core_docs[1].slug = config.core_docs[0].slug.clone();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate slug"));

        let mut config = SyncConfig::default();
        config.guides[0].slug = "../escaped".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("plain path segments"));

        let mut config = SyncConfig::default();
        config.site.base = String::new();
        assert!(config.validate().is_ok());
        assert_eq!(config.site_url("changelog"), "/changelog/");
    }

    #[test]
    fn load_config_without_file_uses_defaults() {
        let dir = std::env::temp_dir().join("skilldocs-config-test-missing");
        let config = load_config(&dir, None).expect("defaults");
        assert_eq!(config.paths.public_dir, PathBuf::from("site/public"));
    }

    #[test]
    fn load_config_explicit_missing_is_error() {
        let path = std::env::temp_dir().join("skilldocs-config-test-nope.toml");
        let err = load_config(Path::new("."), Some(&path)).unwrap_err();
        assert!(err.is_not_found());
    }
}
