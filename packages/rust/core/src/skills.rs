//! Skill pages.
//!
//! Skills are loaded in two steps. [`load_skills`] parses every
//! `skills/<name>/SKILL.md` once; [`SkillIndex::build`] records each skill's
//! domain and title so that [`sync_skill_pages`] can turn `related-skills`
//! names into links. Pages are emitted grouped by domain in the configured
//! domain order, then by skill name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use skilldocs_markdown::{
    CleanOptions, PageFrontmatter, clean_body, extract_first_heading, first_paragraph,
    link_reference_files, parse_frontmatter, truncate_description,
};
use skilldocs_shared::{
    Category, DEFAULT_SKILL_DOMAIN, Result, SkillIndexEntry, SkillMeta, Skipped, SyncConfig,
    title_case,
};

use crate::linkmap::skill_path;
use crate::sync::{SyncContext, SyncOutput, read_source, segment_slug};

/// File that marks a directory as a skill.
pub const SKILL_FILE_NAME: &str = "SKILL.md";

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// One parsed `SKILL.md`.
#[derive(Debug, Clone)]
pub struct SkillSource {
    /// Directory name; the skill's identity in the index.
    pub name: String,
    /// URL segment derived from the directory name.
    pub slug: String,
    /// Slugged `metadata.domain`, or the default bucket.
    pub domain: String,
    /// `SKILL.md` path relative to the repository root.
    pub path: PathBuf,
    pub meta: SkillMeta,
    /// Body with the frontmatter removed, otherwise untouched.
    pub body: String,
}

impl SkillSource {
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// First H1, else the title-cased directory name.
    pub fn title(&self) -> String {
        extract_first_heading(&self.body).unwrap_or_else(|| title_case(&self.name))
    }
}

/// Skills that parsed, plus the ones that did not.
#[derive(Debug, Clone, Default)]
pub struct LoadedSkills {
    /// `SKILL.md` files examined.
    pub processed: usize,
    pub skills: Vec<SkillSource>,
    pub skipped: Vec<Skipped>,
}

/// Parse every skill directory under the skills dir, in name order.
///
/// Hidden directories and directories without a `SKILL.md` are ignored
/// silently. A `SKILL.md` whose frontmatter does not parse is skipped, as
/// is one whose directory name slugs to nothing usable. A domain that is not
/// a usable URL segment files the skill under the default bucket.
#[instrument(skip_all, fields(dir = %config.paths.skills_dir.display()))]
pub fn load_skills(root: &Path, config: &SyncConfig) -> LoadedSkills {
    let mut loaded = LoadedSkills::default();
    let dir = &config.paths.skills_dir;

    let names = match skill_dir_names(&root.join(dir)) {
        Ok(names) => names,
        Err(e) => {
            let reason = match e.kind() {
                std::io::ErrorKind::NotFound => "directory not found".to_string(),
                _ => format!("unreadable: {e}"),
            };
            let skipped = Skipped::new(dir, reason);
            warn!("{skipped}");
            loaded.skipped.push(skipped);
            return loaded;
        }
    };

    for name in names {
        let path = dir.join(&name).join(SKILL_FILE_NAME);
        if !root.join(&path).is_file() {
            debug!(skill = %name, "no SKILL.md, ignoring directory");
            continue;
        }
        loaded.processed += 1;

        let parsed = read_source(root, &path).and_then(|text| {
            let (meta, body) = parse_frontmatter::<SkillMeta>(&text)
                .map_err(|e| Skipped::new(&path, format!("malformed frontmatter: {e}")))?;
            let slug = segment_slug(&name)
                .ok_or_else(|| Skipped::new(&path, "invalid skill directory name"))?;
            Ok((meta, body.to_string(), slug))
        });

        match parsed {
            Ok((meta, body, slug)) => loaded.skills.push(SkillSource {
                domain: skill_domain(&path, &meta),
                name,
                slug,
                path,
                meta,
                body,
            }),
            Err(skipped) => {
                warn!("{skipped}");
                loaded.skipped.push(skipped);
            }
        }
    }

    info!(
        loaded = loaded.skills.len(),
        skipped = loaded.skipped.len(),
        "skills loaded"
    );
    loaded
}

/// Slugged `metadata.domain`; unusable values fall back to the default bucket.
fn skill_domain(path: &Path, meta: &SkillMeta) -> String {
    segment_slug(meta.domain()).unwrap_or_else(|| {
        warn!(
            path = %path.display(),
            domain = meta.domain(),
            "invalid domain, filing under {DEFAULT_SKILL_DOMAIN}"
        );
        DEFAULT_SKILL_DOMAIN.to_string()
    })
}

/// Sorted names of visible subdirectories.
pub fn skill_dir_names(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

// ---------------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------------

/// Skill directory name to domain and title.
#[derive(Debug, Clone, Default)]
pub struct SkillIndex {
    entries: BTreeMap<String, SkillIndexEntry>,
}

impl SkillIndex {
    pub fn build(skills: &[SkillSource]) -> Self {
        let entries = skills
            .iter()
            .map(|skill| {
                (
                    skill.name.clone(),
                    SkillIndexEntry {
                        domain: skill.domain().to_string(),
                        slug: skill.slug.clone(),
                        title: skill.title(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&SkillIndexEntry> {
        self.entries.get(name)
    }

    /// Site URL of a skill page, if the skill is known.
    pub fn url(&self, config: &SyncConfig, name: &str) -> Option<String> {
        self.get(name)
            .map(|entry| config.site_url(&skill_path(&entry.domain, &entry.slug)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// Write one page per loaded skill, grouped by domain order.
#[instrument(skip_all, fields(skills = skills.len()))]
pub fn sync_skill_pages(
    ctx: &SyncContext<'_>,
    skills: &[SkillSource],
    index: &SkillIndex,
) -> Result<SyncOutput> {
    let mut output = SyncOutput::new();

    let mut ordered: Vec<&SkillSource> = skills.iter().collect();
    ordered.sort_by_cached_key(|skill| (ctx.config.domain_rank(skill.domain()), skill.slug.clone()));

    for skill in ordered {
        output.processed += 1;
        let domain = skill.domain();

        let blob_prefix = format!(
            "{}/{}",
            ctx.config.site.repo_blob_url.trim_end_matches('/'),
            skill.path.parent().unwrap_or(Path::new("")).to_string_lossy()
        );
        let body = link_reference_files(&skill.body, &blob_prefix);
        let body = clean_body(&body, &ctx.rewriter, &CleanOptions::default());

        let header = render_skill_header(ctx.config, &skill.meta, domain, index);
        let page_body = if body.is_empty() {
            header
        } else {
            format!("{header}\n\n{body}")
        };

        let title = index
            .get(&skill.name)
            .map(|entry| entry.title.clone())
            .unwrap_or_else(|| skill.title());

        let description = skill
            .meta
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(truncate_description)
            .or_else(|| first_paragraph(&body).map(|p| truncate_description(&p)))
            .unwrap_or_default();

        let frontmatter = PageFrontmatter {
            title,
            description,
            sidebar_label: None,
            sidebar_order: None,
        };

        let page = ctx.emit_page(
            &skill_path(domain, &skill.slug),
            &frontmatter,
            &page_body,
            Category::Skills(domain.to_string()),
        )?;
        output.push(page);
    }

    info!(written = output.entries.len(), "skill pages synced");
    Ok(output)
}

/// Attribute table, triggers and related skills placed above the body.
pub fn render_skill_header(
    config: &SyncConfig,
    meta: &SkillMeta,
    domain: &str,
    index: &SkillIndex,
) -> String {
    let m = &meta.metadata;

    let mut rows = vec![("Domain", config.domain_label(domain))];
    for (label, value) in [("Role", &m.role), ("Scope", &m.scope), ("Output", &m.output_format)] {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            rows.push((label, value.to_string()));
        }
    }

    let mut out = String::from("| Attribute | Value |\n|-----------|-------|\n");
    for (label, value) in rows {
        out.push_str(&format!("| {label} | {} |\n", escape_table_cell(&value)));
    }

    if !m.triggers.is_empty() {
        out.push_str(&format!("\n**Triggers:** {}\n", m.triggers.join(", ")));
    }

    if !m.related_skills.is_empty() {
        let related: Vec<String> = m
            .related_skills
            .iter()
            .map(|name| match (index.get(name), index.url(config, name)) {
                (Some(entry), Some(url)) => format!("[{}]({url})", entry.title),
                _ => name.clone(),
            })
            .collect();
        out.push_str(&format!("\n**Related Skills:** {}\n", related.join(", ")));
    }

    out.trim_end().to_string()
}

fn escape_table_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}
