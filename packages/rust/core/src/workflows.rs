//! Workflow docs: every `*.md` in the workflow directory becomes a page.

use std::collections::BTreeSet;

use tracing::{info, instrument};

use skilldocs_markdown::{
    CleanOptions, PageFrontmatter, clean_body, extract_first_heading, first_paragraph,
    parse_frontmatter, truncate_description,
};
use skilldocs_shared::{Category, DocMeta, Result, Skipped, title_case};

use crate::linkmap::workflow_path;
use crate::sync::{SyncContext, SyncOutput, list_markdown_files, read_source, workflow_slug};

/// Sync the workflow directory in file-name order.
#[instrument(skip_all, fields(dir = %ctx.config.paths.workflow_dir.display()))]
pub fn sync_workflows(ctx: &SyncContext<'_>) -> Result<SyncOutput> {
    let mut output = SyncOutput::new();
    let dir = &ctx.config.paths.workflow_dir;

    let files = match list_markdown_files(ctx.root, dir) {
        Ok(files) => files,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            output.skip(Skipped::new(dir, "directory not found"));
            return Ok(output);
        }
        Err(e) => {
            output.skip(Skipped::new(dir, format!("unreadable: {e}")));
            return Ok(output);
        }
    };

    let mut slugs = BTreeSet::new();

    for file in files {
        output.processed += 1;

        let Some(stem) = file.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        let slug = workflow_slug(&stem);
        if slug.is_empty() {
            output.skip(Skipped::new(&file, "empty slug"));
            continue;
        }
        if !slugs.insert(slug.clone()) {
            output.skip(Skipped::new(&file, format!("duplicate slug '{slug}'")));
            continue;
        }

        let text = match read_source(ctx.root, &file) {
            Ok(text) => text,
            Err(skipped) => {
                output.skip(skipped);
                continue;
            }
        };

        let (meta, raw_body) = match parse_frontmatter::<DocMeta>(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                output.skip(Skipped::new(&file, format!("malformed frontmatter: {e}")));
                continue;
            }
        };

        let title = extract_first_heading(raw_body)
            .or(meta.title)
            .unwrap_or_else(|| title_case(&stem));

        let body = clean_body(raw_body, &ctx.rewriter, &CleanOptions::default());

        let description = meta
            .description
            .or_else(|| first_paragraph(&body))
            .map(|d| truncate_description(&d))
            .unwrap_or_default();

        let frontmatter = PageFrontmatter {
            title,
            description,
            sidebar_label: None,
            sidebar_order: None,
        };

        let page = ctx.emit_page(&workflow_path(&slug), &frontmatter, &body, Category::Workflows)?;
        output.push(page);
    }

    info!(
        processed = output.processed,
        written = output.entries.len(),
        skipped = output.skipped.len(),
        "workflow docs synced"
    );
    Ok(output)
}
