//! Frontmatter-free markdown mirrors served next to each HTML page.

use std::path::{Path, PathBuf};

use tracing::debug;

use skilldocs_markdown::{render_mirror, split_frontmatter};
use skilldocs_shared::{
    PageManifest, PageManifestEntry, Result, SkillDocsError, SyncConfig, VersionInfo,
};

/// File name of every mirror, so `GET <url>/index.html.md` resolves.
pub const MIRROR_FILE_NAME: &str = "index.html.md";

/// A rendered mirror and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    pub site_url: String,
    pub path: PathBuf,
    pub content: String,
}

/// Mirror location for a site URL: the URL without the base path, under
/// the public directory.
///
/// A URL with `.` or `..` segments is rejected rather than resolved.
pub fn mirror_path(public_dir: &Path, base: &str, site_url: &str) -> Result<PathBuf> {
    let relative = site_url.strip_prefix(base).unwrap_or(site_url);
    let relative = relative.trim_matches('/');

    let mut path = public_dir.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty()) {
        if segment == "." || segment == ".." || segment.contains('\\') {
            return Err(SkillDocsError::validation(format!(
                "site URL '{site_url}' leaves the public directory"
            )));
        }
        path.push(segment);
    }
    Ok(path.join(MIRROR_FILE_NAME))
}

/// Render one mirror per manifest entry from the already-written pages.
pub fn render_mirrors(
    public_dir: &Path,
    config: &SyncConfig,
    manifest: &PageManifest,
) -> Result<Vec<Mirror>> {
    manifest
        .entries()
        .iter()
        .map(|entry| render_entry(public_dir, config, entry))
        .collect()
}

fn render_entry(public_dir: &Path, config: &SyncConfig, entry: &PageManifestEntry) -> Result<Mirror> {
    let page = std::fs::read_to_string(&entry.content_file)
        .map_err(|e| SkillDocsError::io(&entry.content_file, e))?;
    let doc = split_frontmatter(&page);

    debug!(url = %entry.site_url, "rendered mirror");

    Ok(Mirror {
        site_url: entry.site_url.clone(),
        path: mirror_path(public_dir, &config.site.base, &entry.site_url)?,
        content: render_mirror(&entry.title, doc.body),
    })
}

/// Hand-composed landing mirror; uses project counters, not the manifest.
pub fn render_landing(config: &SyncConfig, version: &VersionInfo) -> String {
    let base = &config.site.base;
    let mut out = format!("# {}\n\n", config.site.project_name);
    out.push_str(&format!("> {}\n\n", config.site.tagline));
    out.push_str(&format!("Version {}.\n\n", version.version));
    out.push_str(&format!("- {} skills\n", version.skill_count));
    out.push_str(&format!("- {} workflow commands\n", version.workflow_count));
    out.push_str(&format!("- {} reference files\n\n", version.reference_file_count));
    out.push_str("## Machine-readable indexes\n\n");
    out.push_str(&format!(
        "- [llms.txt]({base}/llms.txt): one line per page, grouped by section\n"
    ));
    out.push_str(&format!(
        "- [llms-full.txt]({base}/llms-full.txt): every page in full\n"
    ));
    out
}
