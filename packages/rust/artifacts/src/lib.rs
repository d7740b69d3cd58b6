//! Derived artifacts built from the finished page manifest.
//!
//! Everything here is re-derived from the normalized content tree, never from
//! the original sources, so the HTML pages, the markdown mirrors and the LLM
//! index files cannot drift apart.
//!
//! Output layout under the public directory:
//! ```text
//! <public_dir>/
//! ├── index.html.md                  landing mirror
//! ├── llms.txt                       grouped index
//! ├── llms-full.txt                  full concatenation
//! ├── getting-started/index.html.md  one mirror per manifest entry
//! └── skills/<domain>/<skill>/index.html.md
//! ```

mod llms;
mod mirrors;

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use skilldocs_shared::{PageManifest, Result, SkillDocsError, SyncConfig, VersionInfo};

pub use llms::{Section, group_sections, render_llms_full_txt, render_llms_txt};
pub use mirrors::{MIRROR_FILE_NAME, Mirror, mirror_path, render_landing, render_mirrors};

/// Index file names written at the public root.
pub const LLMS_TXT: &str = "llms.txt";
pub const LLMS_FULL_TXT: &str = "llms-full.txt";

/// What [`generate`] wrote.
#[derive(Debug, Clone)]
pub struct ArtifactReport {
    /// Page mirrors written (the landing mirror is not counted).
    pub mirrors: usize,
    pub landing: PathBuf,
    pub llms_txt: PathBuf,
    pub llms_full_txt: PathBuf,
}

/// Remove previously generated mirrors and `llms*.txt`, then prune empty
/// directories. Returns the number of files removed.
#[instrument(skip_all, fields(public_dir = %public_dir.display()))]
pub fn clean_generated(public_dir: &Path) -> Result<usize> {
    if !public_dir.exists() {
        debug!("public directory absent, nothing to clean");
        return Ok(0);
    }

    let mut removed = 0;
    for name in [LLMS_TXT, LLMS_FULL_TXT] {
        let path = public_dir.join(name);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| SkillDocsError::io(&path, e))?;
            removed += 1;
        }
    }

    removed += remove_mirrors(public_dir)?;
    prune_empty_dirs(public_dir, true)?;

    info!(removed, "cleaned generated public artifacts");
    Ok(removed)
}

/// Write page mirrors, the landing mirror, `llms.txt` and `llms-full.txt`.
#[instrument(skip_all, fields(pages = manifest.len()))]
pub fn generate(
    root: &Path,
    config: &SyncConfig,
    manifest: &PageManifest,
    version: &VersionInfo,
) -> Result<ArtifactReport> {
    let public_dir = root.join(&config.paths.public_dir);
    std::fs::create_dir_all(&public_dir).map_err(|e| SkillDocsError::io(&public_dir, e))?;

    let mirrors = render_mirrors(&public_dir, config, manifest)?;
    for mirror in &mirrors {
        write_atomic(&mirror.path, &mirror.content)?;
    }

    let landing = public_dir.join(MIRROR_FILE_NAME);
    write_atomic(&landing, &render_landing(config, version))?;

    let sections = group_sections(config, manifest.entries());

    let llms_txt = public_dir.join(LLMS_TXT);
    write_atomic(&llms_txt, &render_llms_txt(config, version, &sections))?;

    let llms_full_txt = public_dir.join(LLMS_FULL_TXT);
    write_atomic(&llms_full_txt, &render_llms_full_txt(config, &sections, &mirrors))?;

    info!(
        mirrors = mirrors.len(),
        sections = sections.len(),
        "derived artifacts written"
    );

    Ok(ArtifactReport {
        mirrors: mirrors.len(),
        landing,
        llms_txt,
        llms_full_txt,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Write to a temp file next to the target, then rename over it.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SkillDocsError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp = path.with_file_name(format!(".{file_name}.tmp"));

    std::fs::write(&temp, content).map_err(|e| SkillDocsError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| SkillDocsError::io(path, e))?;

    debug!(path = %path.display(), size = content.len(), "wrote artifact");
    Ok(())
}

/// Recursively delete every mirror file below `dir`.
fn remove_mirrors(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for path in sorted_children(dir)? {
        if path.is_dir() {
            removed += remove_mirrors(&path)?;
        } else if path.file_name().is_some_and(|n| n == MIRROR_FILE_NAME) {
            std::fs::remove_file(&path).map_err(|e| SkillDocsError::io(&path, e))?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Remove empty directories bottom-up; the root itself is kept.
fn prune_empty_dirs(dir: &Path, is_root: bool) -> Result<bool> {
    let mut empty = true;
    for path in sorted_children(dir)? {
        if path.is_dir() {
            if !prune_empty_dirs(&path, false)? {
                empty = false;
            }
        } else {
            empty = false;
        }
    }

    if empty && !is_root {
        std::fs::remove_dir(dir).map_err(|e| SkillDocsError::io(dir, e))?;
        debug!(path = %dir.display(), "pruned empty directory");
        return Ok(true);
    }
    Ok(false)
}

fn sorted_children(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| SkillDocsError::io(dir, e))?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SkillDocsError::io(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
