//! Table-driven doc synchronizers: core docs and guides.

use std::path::Path;

use tracing::{info, instrument};

use skilldocs_markdown::{
    CleanOptions, PageFrontmatter, clean_body, first_paragraph, parse_frontmatter,
    truncate_description,
};
use skilldocs_shared::{Category, DocCategory, DocEntry, DocMeta, Result, Skipped};

use crate::linkmap::guide_path;
use crate::sync::{SyncContext, SyncOutput, read_source};

/// Which table is being synced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFamily {
    Core,
    Guides,
}

impl DocFamily {
    fn url_path(self, slug: &str) -> String {
        match self {
            Self::Core => slug.trim_matches('/').to_string(),
            Self::Guides => guide_path(slug),
        }
    }

    fn category(self, entry: &DocEntry) -> Category {
        match (self, entry.category) {
            (Self::Guides, _) => Category::Guides,
            (Self::Core, DocCategory::Docs) => Category::Docs,
            (Self::Core, DocCategory::Project) => Category::Project,
        }
    }
}

/// Sync the configured core docs.
#[instrument(skip_all)]
pub fn sync_core_docs(ctx: &SyncContext<'_>) -> Result<SyncOutput> {
    sync_table(ctx, &ctx.config.core_docs, DocFamily::Core)
}

/// Sync the configured guides under `guides/`.
#[instrument(skip_all)]
pub fn sync_guides(ctx: &SyncContext<'_>) -> Result<SyncOutput> {
    sync_table(ctx, &ctx.config.guides, DocFamily::Guides)
}

fn sync_table(ctx: &SyncContext<'_>, entries: &[DocEntry], family: DocFamily) -> Result<SyncOutput> {
    let mut output = SyncOutput::new();

    for entry in entries {
        output.processed += 1;
        let source = Path::new(&entry.source);

        let text = match read_source(ctx.root, source) {
            Ok(text) => text,
            Err(skipped) => {
                output.skip(skipped);
                continue;
            }
        };

        let (meta, body) = match parse_frontmatter::<DocMeta>(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                output.skip(Skipped::new(source, format!("malformed frontmatter: {e}")));
                continue;
            }
        };

        let body = clean_body(
            body,
            &ctx.rewriter,
            &CleanOptions {
                strip_centered_blocks: true,
            },
        );

        let description = entry
            .description
            .clone()
            .or(meta.description)
            .or_else(|| first_paragraph(&body))
            .map(|d| truncate_description(&d))
            .unwrap_or_default();

        let frontmatter = PageFrontmatter {
            title: entry.title.clone(),
            description,
            sidebar_label: entry.sidebar_label.clone(),
            sidebar_order: entry.order,
        };

        let page = ctx.emit_page(
            &family.url_path(&entry.slug),
            &frontmatter,
            &body,
            family.category(entry),
        )?;
        output.push(page);
    }

    info!(
        family = ?family,
        processed = output.processed,
        written = output.entries.len(),
        skipped = output.skipped.len(),
        "doc table synced"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use skilldocs_markdown::{LinkMap, LinkRewriter};
    use skilldocs_shared::SyncConfig;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("skilldocs-docs-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn entry(source: &str, slug: &str, title: &str) -> DocEntry {
        DocEntry {
            source: source.into(),
            slug: slug.into(),
            title: title.into(),
            description: None,
            sidebar_label: None,
            order: None,
            category: DocCategory::Docs,
        }
    }

    fn config(core: Vec<DocEntry>, guides: Vec<DocEntry>) -> SyncConfig {
        SyncConfig {
            core_docs: core,
            guides,
            ..SyncConfig::default()
        }
    }

    #[test]
    fn core_doc_heading_removed() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("QUICKSTART.md"), "# Getting Started\n\nSome text.").unwrap();
        let config = config(vec![entry("QUICKSTART.md", "getting-started", "Getting Started")], vec![]);
        let map = LinkMap::new();
        let ctx = SyncContext {
            root: &tmp,
            config: &config,
            rewriter: LinkRewriter::new(&map, &config.site.base, &[]),
            progress: &SilentProgress,
        };

        let output = sync_core_docs(&ctx).unwrap();

        assert_eq!(output.entries.len(), 1);
        let page = std::fs::read_to_string(&output.entries[0].content_file).unwrap();
        assert!(page.starts_with("---\ntitle: \"Getting Started\"\n"));
        assert_eq!(
            page,
            "---\ntitle: \"Getting Started\"\ndescription: \"Some text.\"\n---\n\nSome text.\n"
        );
        assert_eq!(output.entries[0].site_url, "/claude-skills/getting-started/");
        assert_eq!(output.entries[0].category, Category::Docs);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn table_sidebar_label_and_order_rendered() {
        let tmp = temp_dir();
        std::fs::write(
            tmp.join("WORKFLOW.md"),
            "---\ndescription: |\n  Phases and\n  commands.\n---\n# Workflow Commands\n\nBody.\n",
        )
        .unwrap();
        let mut doc = entry("WORKFLOW.md", "workflow-commands", "Workflow Commands Reference");
        doc.sidebar_label = Some("Workflow".into());
        doc.order = Some(3);
        let config = config(vec![doc], vec![]);
        let map = LinkMap::new();
        let ctx = SyncContext {
            root: &tmp,
            config: &config,
            rewriter: LinkRewriter::new(&map, &config.site.base, &[]),
            progress: &SilentProgress,
        };

        let output = sync_core_docs(&ctx).unwrap();
        let page = std::fs::read_to_string(&output.entries[0].content_file).unwrap();

        assert!(page.contains("sidebar:\n  label: \"Workflow\"\n  order: 3\n"));
        assert_eq!(output.entries[0].description, "Phases and commands.");

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_and_malformed_sources_skipped() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("BAD.md"), "---\ntitle: [oops\n---\n# Bad\n").unwrap();
        std::fs::write(tmp.join("GOOD.md"), "# Good\n\nFine.\n").unwrap();
        let config = config(
            vec![
                entry("MISSING.md", "missing", "Missing"),
                entry("BAD.md", "bad", "Bad"),
                entry("GOOD.md", "good", "Good"),
            ],
            vec![],
        );
        let map = LinkMap::new();
        let ctx = SyncContext {
            root: &tmp,
            config: &config,
            rewriter: LinkRewriter::new(&map, &config.site.base, &[]),
            progress: &SilentProgress,
        };

        let output = sync_core_docs(&ctx).unwrap();

        assert_eq!(output.processed, 3);
        assert_eq!(output.entries.len(), 1);
        assert_eq!(output.skipped.len(), 2);
        assert_eq!(output.skipped[0].reason, "not found");
        assert!(output.skipped[1].reason.starts_with("malformed frontmatter"));
        assert!(!tmp.join("site/src/content/docs/bad.md").exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn guides_strip_banners_and_rewrite_links() {
        let tmp = temp_dir();
        std::fs::create_dir_all(tmp.join("docs")).unwrap();
        std::fs::write(
            tmp.join("docs/SETUP.md"),
            "<div align=\"center\">\n<img src=\"banner.png\">\n</div>\n\n# Setup\n\nRead [the quickstart](../QUICKSTART.md#install) first.\n",
        )
        .unwrap();

        let mut setup = entry("docs/SETUP.md", "setup", "Setup");
        setup.order = Some(4);
        setup.category = DocCategory::Project;
        let config = config(vec![entry("QUICKSTART.md", "getting-started", "Getting Started")], vec![setup]);

        let mut map = LinkMap::new();
        map.register_variants("QUICKSTART.md", "/claude-skills/getting-started/");
        let ctx = SyncContext {
            root: &tmp,
            config: &config,
            rewriter: LinkRewriter::new(&map, &config.site.base, &[]),
            progress: &SilentProgress,
        };

        let output = sync_guides(&ctx).unwrap();

        let entry = &output.entries[0];
        assert_eq!(entry.site_url, "/claude-skills/guides/setup/");
        assert_eq!(entry.category, Category::Guides);
        let page = std::fs::read_to_string(&entry.content_file).unwrap();
        assert!(!page.contains("banner.png"));
        assert!(page.contains("sidebar:\n  order: 4\n"));
        assert!(page.contains("[the quickstart](/claude-skills/getting-started/#install)"));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
