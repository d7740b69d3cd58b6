//! Content tree writer.
//!
//! Clears the previous generation's synced pages and writes normalized
//! pages into the content directory. Layout:
//! ```text
//! <content_dir>/
//! ├── getting-started.md        core docs (one file per table slug)
//! ├── guides/<slug>.md
//! ├── workflows/<slug>.md
//! ├── skills/<domain>/<skill>.md
//! └── index.mdx                 hand-authored, never touched
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use skilldocs_shared::{Result, SkillDocsError, SyncConfig};

/// Directories owned entirely by the pipeline.
const GENERATED_DIRS: [&str; 3] = ["guides", "workflows", "skills"];

/// Delete everything the previous run generated in the content tree.
///
/// Only pipeline-owned directories and the core doc files named in the
/// config are removed; hand-authored pages next to them survive.
#[instrument(skip_all, fields(content_dir = %content_dir.display()))]
pub fn clean_content_tree(content_dir: &Path, config: &SyncConfig) -> Result<usize> {
    let mut removed = 0;

    for dir in GENERATED_DIRS {
        let path = content_dir.join(dir);
        if path.is_dir() {
            std::fs::remove_dir_all(&path).map_err(|e| SkillDocsError::io(&path, e))?;
            removed += 1;
        }
    }

    for doc in &config.core_docs {
        let path = page_file(content_dir, doc.slug.trim_matches('/'))?;
        if path.is_file() {
            std::fs::remove_file(&path).map_err(|e| SkillDocsError::io(&path, e))?;
            removed += 1;
        }
    }

    info!(removed, "cleaned previous content");
    Ok(removed)
}

/// Write a single page's Markdown file, creating parent directories.
///
/// Write failures are fatal: a half-written tree must not be published.
pub fn write_page(content_dir: &Path, url_path: &str, markdown: &str) -> Result<PathBuf> {
    let file_path = page_file(content_dir, url_path)?;

    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SkillDocsError::io(parent, e))?;
    }

    std::fs::write(&file_path, markdown).map_err(|e| SkillDocsError::io(&file_path, e))?;

    debug!(path = %file_path.display(), "wrote page");
    Ok(file_path)
}

/// `<content_dir>/<url_path>.md`; refuses paths that would leave the tree.
fn page_file(content_dir: &Path, url_path: &str) -> Result<PathBuf> {
    let segments: Vec<&str> = url_path.split('/').filter(|s| !s.is_empty()).collect();
    if segments
        .iter()
        .any(|s| *s == "." || *s == ".." || s.contains('\\'))
    {
        return Err(SkillDocsError::validation(format!(
            "page path '{url_path}' leaves the content directory"
        )));
    }

    let mut path = content_dir.to_path_buf();
    if let Some((last, parents)) = segments.split_last() {
        for segment in parents {
            path.push(segment);
        }
        path.push(format!("{last}.md"));
    }
    Ok(path)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
