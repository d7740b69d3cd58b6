//! State and helpers shared by the content synchronizers.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use skilldocs_markdown::{LinkRewriter, PageFrontmatter, render_page};
use skilldocs_shared::{Category, PageManifestEntry, Result, Skipped, SyncConfig};

use crate::assembler;
use crate::pipeline::ProgressReporter;

/// Read-only inputs every synchronizer needs.
pub struct SyncContext<'a> {
    /// Repository root; all configured paths are relative to it.
    pub root: &'a Path,
    pub config: &'a SyncConfig,
    pub rewriter: LinkRewriter<'a>,
    pub progress: &'a dyn ProgressReporter,
}

impl SyncContext<'_> {
    pub fn content_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.content_dir)
    }

    /// Render and write one normalized page, returning its manifest entry.
    ///
    /// `url_path` is the page's site path without base or slashes, e.g.
    /// `skills/language/python-pro`; the file lands at `<url_path>.md`.
    pub fn emit_page(
        &self,
        url_path: &str,
        frontmatter: &PageFrontmatter,
        body: &str,
        category: Category,
    ) -> Result<PageManifestEntry> {
        let markdown = render_page(frontmatter, body);
        let content_file = assembler::write_page(&self.content_dir(), url_path, &markdown)?;
        let site_url = self.config.site_url(url_path);

        self.progress.page_written(&site_url);

        Ok(PageManifestEntry {
            site_url,
            title: frontmatter.title.clone(),
            description: frontmatter.description.clone(),
            category,
            content_file,
        })
    }
}

/// What one synchronizer produced: manifest entries plus non-fatal skips.
#[derive(Debug, Clone, Default)]
pub struct SyncOutput {
    /// Source files examined.
    pub processed: usize,
    pub entries: Vec<PageManifestEntry>,
    pub skipped: Vec<Skipped>,
}

impl SyncOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a skipped source.
    pub fn skip(&mut self, skipped: Skipped) {
        warn!("{skipped}");
        self.skipped.push(skipped);
    }

    pub fn push(&mut self, entry: PageManifestEntry) {
        debug!(url = %entry.site_url, title = %entry.title, "synced page");
        self.entries.push(entry);
    }
}

/// Read a source file relative to the root.
///
/// A missing file or an unreadable one is a skip, not an error: optional
/// docs may not have been written yet.
pub fn read_source(root: &Path, relative: &Path) -> std::result::Result<String, Skipped> {
    let path = root.join(relative);
    std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Skipped::new(relative, "not found"),
        _ => Skipped::new(relative, format!("unreadable: {e}")),
    })
}

/// URL slug for a workflow file stem: lowercase, `_` and spaces to `-`.
pub fn workflow_slug(stem: &str) -> String {
    stem.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '_' | ' ' => '-',
            c => c,
        })
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '.')
        .collect()
}

/// Slug for a free-form path segment taken from frontmatter or a directory
/// name, using the workflow rules.
///
/// `None` when the value names another directory (`/`, `\`, `..`) or has
/// nothing left after slugging.
pub fn segment_slug(value: &str) -> Option<String> {
    let value = value.trim();
    if value.contains(['/', '\\']) || value.contains("..") {
        return None;
    }
    let slug = workflow_slug(value);
    (!slug.is_empty() && slug != ".").then_some(slug)
}

/// Sorted `*.md` files directly inside `dir`, relative to `root`.
pub fn list_markdown_files(root: &Path, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(root.join(dir))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            files.push(dir.join(entry.file_name()));
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_slugs() {
        assert_eq!(workflow_slug("COMMON_UI_PATTERNS"), "common-ui-patterns");
        assert_eq!(workflow_slug("01 Discovery Phase"), "01-discovery-phase");
        assert_eq!(workflow_slug("plan-feature"), "plan-feature");
        assert_eq!(workflow_slug("what?"), "what");
    }

    #[test]
    fn segment_slugs_stay_in_their_directory() {
        assert_eq!(segment_slug("Data ML").as_deref(), Some("data-ml"));
        assert_eq!(segment_slug(" backend ").as_deref(), Some("backend"));
        assert_eq!(segment_slug("v1.2").as_deref(), Some("v1.2"));
        assert_eq!(segment_slug("../../../../escaped"), None);
        assert_eq!(segment_slug("a/b"), None);
        assert_eq!(segment_slug("a\\b"), None);
        assert_eq!(segment_slug(".."), None);
        assert_eq!(segment_slug("."), None);
        assert_eq!(segment_slug("???"), None);
    }

    #[test]
    fn read_source_missing_is_skip() {
        let root = std::env::temp_dir();
        let skipped = read_source(&root, Path::new("skilldocs-definitely-missing.md")).unwrap_err();
        assert_eq!(skipped.reason, "not found");
        assert_eq!(skipped.path, PathBuf::from("skilldocs-definitely-missing.md"));
    }

    #[test]
    fn output_records_skips() {
        let mut out = SyncOutput::new();
        out.skip(Skipped::new("a.md", "not found"));
        assert_eq!(out.skipped.len(), 1);
        assert!(out.entries.is_empty());
    }
}
