//! Core domain types for the content-sync pipeline.

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, SkillDocsError};

/// Domain bucket for skills whose frontmatter carries no `metadata.domain`.
pub const DEFAULT_SKILL_DOMAIN: &str = "specialized";

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Closed set of manifest categories; drives `llms.txt` grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Category {
    Docs,
    Guides,
    Workflows,
    Project,
    /// Skill pages, tagged with their domain id (e.g. `language`).
    Skills(String),
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Docs => f.write_str("docs"),
            Self::Guides => f.write_str("guides"),
            Self::Workflows => f.write_str("workflows"),
            Self::Project => f.write_str("project"),
            Self::Skills(domain) => write!(f, "skills:{domain}"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = SkillDocsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "docs" => Ok(Self::Docs),
            "guides" => Ok(Self::Guides),
            "workflows" => Ok(Self::Workflows),
            "project" => Ok(Self::Project),
            other => match other.strip_prefix("skills:") {
                Some(domain) if !domain.is_empty() => Ok(Self::Skills(domain.to_string())),
                _ => Err(SkillDocsError::parse(format!("unknown category '{other}'"))),
            },
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.to_string()
    }
}

impl TryFrom<String> for Category {
    type Error = SkillDocsError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// Page manifest
// ---------------------------------------------------------------------------

/// One generated page, recorded for derived-artifact generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageManifestEntry {
    /// Absolute site URL including the base path, with trailing slash.
    pub site_url: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    /// The normalized page written to the content tree.
    pub content_file: PathBuf,
}

/// Ordered list of generated pages with unique site URLs.
///
/// Synchronizers return their entries; the orchestrator merges them here in
/// pipeline order, which is also the order artifact generators see.
#[derive(Debug, Clone, Default)]
pub struct PageManifest {
    entries: Vec<PageManifestEntry>,
    urls: BTreeSet<String>,
}

impl PageManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of entries, rejecting any site URL already present.
    pub fn merge(&mut self, entries: impl IntoIterator<Item = PageManifestEntry>) -> Result<()> {
        for entry in entries {
            if !self.urls.insert(entry.site_url.clone()) {
                return Err(SkillDocsError::validation(format!(
                    "duplicate site URL {} (from {})",
                    entry.site_url,
                    entry.content_file.display()
                )));
            }
            self.entries.push(entry);
        }
        Ok(())
    }

    pub fn entries(&self) -> &[PageManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.urls.contains(url)
    }
}

// ---------------------------------------------------------------------------
// Skips
// ---------------------------------------------------------------------------

/// A non-fatal omission: the file was not turned into a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

impl Skipped {
    pub fn new(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SKIP {} ({})", self.path.display(), self.reason)
    }
}

// ---------------------------------------------------------------------------
// Skill index
// ---------------------------------------------------------------------------

/// Display data for one skill, keyed by directory name in the skill index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillIndexEntry {
    pub domain: String,
    /// URL segment of the skill page.
    pub slug: String,
    pub title: String,
}

// ---------------------------------------------------------------------------
// Version metadata
// ---------------------------------------------------------------------------

/// Project-wide counters from `version.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VersionInfo {
    pub version: String,
    pub skill_count: u32,
    pub workflow_count: u32,
    pub reference_file_count: u32,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            version: "0.0.0".into(),
            skill_count: 0,
            workflow_count: 0,
            reference_file_count: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Typed frontmatter
// ---------------------------------------------------------------------------

/// Frontmatter accepted on core docs, guides and workflow docs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DocMeta {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Frontmatter of a `SKILL.md`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SkillMeta {
    pub name: Option<String>,
    pub description: Option<String>,
    pub metadata: SkillMetadata,
}

/// The `metadata:` sub-object of a skill's frontmatter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SkillMetadata {
    pub domain: Option<String>,
    pub role: Option<String>,
    pub scope: Option<String>,
    pub output_format: Option<String>,
    #[serde(deserialize_with = "comma_list")]
    pub triggers: Vec<String>,
    #[serde(deserialize_with = "comma_list")]
    pub related_skills: Vec<String>,
}

impl SkillMeta {
    /// Domain id, falling back to [`DEFAULT_SKILL_DOMAIN`].
    pub fn domain(&self) -> &str {
        self.metadata
            .domain
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_SKILL_DOMAIN)
    }
}

/// Accept either `a, b, c` or a YAML sequence.
fn comma_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let items = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(s)) => s.split(',').map(str::to_string).collect(),
        Some(OneOrMany::Many(v)) => v,
    };

    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

/// Human-readable title from a slug or file stem (`data-ml` -> `Data Ml`).
pub fn title_case(slug: &str) -> String {
    slug.replace(['-', '_'], " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    format!("{upper}{}", chars.as_str().to_lowercase())
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
