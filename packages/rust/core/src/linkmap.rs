//! Builds the global source-path to site-URL map before any rewriting.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use skilldocs_markdown::LinkMap;
use skilldocs_shared::SyncConfig;

use crate::sync::{list_markdown_files, workflow_slug};

/// Site path of a guide page.
pub fn guide_path(slug: &str) -> String {
    format!("guides/{}", slug.trim_matches('/'))
}

/// Site path of a workflow page.
pub fn workflow_path(slug: &str) -> String {
    format!("workflows/{slug}")
}

/// Site path of a skill page.
pub fn skill_path(domain: &str, name: &str) -> String {
    format!("skills/{domain}/{name}")
}

/// Top-level site sections an unprefixed absolute link may point into.
pub fn site_sections(config: &SyncConfig) -> Vec<String> {
    let mut sections: Vec<String> = config
        .core_docs
        .iter()
        .map(|d| d.slug.trim_matches('/').to_string())
        .collect();
    sections.extend(["guides", "workflows", "skills"].map(String::from));
    sections.sort();
    sections.dedup();
    sections
}

/// Register every way a source link may reference a synced document.
///
/// Core docs and guides come from the config tables and are registered only
/// when their source file exists. Workflow docs are
/// enumerated from disk and additionally registered under their
/// directory-qualified name (`workflow/<file>.md`).
#[instrument(skip_all)]
pub fn build_link_map(root: &Path, config: &SyncConfig) -> LinkMap {
    let mut map = LinkMap::new();

    // A missing source produces no page, so links to it stay as written.
    for doc in config.core_docs.iter().filter(|d| root.join(&d.source).is_file()) {
        map.register_variants(&doc.source, &config.site_url(&doc.slug));
    }

    for guide in config.guides.iter().filter(|g| root.join(&g.source).is_file()) {
        map.register_variants(&guide.source, &config.site_url(&guide_path(&guide.slug)));
    }

    let workflow_dir = &config.paths.workflow_dir;
    match list_markdown_files(root, workflow_dir) {
        Ok(files) => {
            let dir_name = workflow_dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string());

            for file in files {
                let Some(stem) = file.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                    continue;
                };
                let Some(file_name) = file.file_name().map(|s| s.to_string_lossy().to_string())
                else {
                    continue;
                };

                let target = config.site_url(&workflow_path(&workflow_slug(&stem)));
                map.register_variants(&file.to_string_lossy(), &target);

                if let Some(dir_name) = &dir_name {
                    map.register(format!("{dir_name}/{file_name}"), target.clone());
                    map.register(format!("./{dir_name}/{file_name}"), target.clone());
                }
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %workflow_dir.display(), "workflow directory absent");
        }
        Err(e) => {
            warn!(dir = %workflow_dir.display(), error = %e, "cannot list workflow directory");
        }
    }

    info!(keys = map.len(), "link map built");
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir() -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("skilldocs-linkmap-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn table_docs_registered() {
        let tmp = temp_dir();
        std::fs::create_dir_all(tmp.join("docs")).unwrap();
        for source in ["QUICKSTART.md", "docs/WORKFLOW_COMMANDS.md", "docs/LOCAL_DEVELOPMENT.md"] {
            std::fs::write(tmp.join(source), "# Doc\n").unwrap();
        }
        let config = SyncConfig::default();
        let map = build_link_map(&tmp, &config);

        assert_eq!(map.get("QUICKSTART.md"), Some("/claude-skills/getting-started/"));
        assert_eq!(map.get("./QUICKSTART.md"), Some("/claude-skills/getting-started/"));
        assert_eq!(
            map.get("WORKFLOW_COMMANDS.md"),
            Some("/claude-skills/workflow-commands/")
        );
        assert_eq!(
            map.get("docs/LOCAL_DEVELOPMENT.md"),
            Some("/claude-skills/guides/local-development/")
        );

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_table_docs_not_registered() {
        let tmp = temp_dir();
        std::fs::write(tmp.join("QUICKSTART.md"), "# Quick\n").unwrap();

        let map = build_link_map(&tmp, &SyncConfig::default());

        assert_eq!(map.get("QUICKSTART.md"), Some("/claude-skills/getting-started/"));
        assert_eq!(map.get("CHANGELOG.md"), None);
        assert_eq!(map.get("docs/LOCAL_DEVELOPMENT.md"), None);
        assert_eq!(map.get("LOCAL_DEVELOPMENT.md"), None);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn workflow_files_enumerated() {
        let tmp = temp_dir();
        let dir = tmp.join("docs/workflow");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Plan_Feature.md"), "# Plan").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let map = build_link_map(&tmp, &SyncConfig::default());
        let target = Some("/claude-skills/workflows/plan-feature/");

        assert_eq!(map.get("docs/workflow/Plan_Feature.md"), target);
        assert_eq!(map.get("./docs/workflow/Plan_Feature.md"), target);
        assert_eq!(map.get("Plan_Feature.md"), target);
        assert_eq!(map.get("workflow/Plan_Feature.md"), target);
        assert_eq!(map.get("./workflow/Plan_Feature.md"), target);
        assert!(map.iter().all(|(k, _)| !k.ends_with(".txt")));

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn sections_include_core_slugs() {
        let sections = site_sections(&SyncConfig::default());
        assert!(sections.contains(&"getting-started".to_string()));
        assert!(sections.contains(&"skills".to_string()));
        assert!(sections.contains(&"workflows".to_string()));
    }
}
